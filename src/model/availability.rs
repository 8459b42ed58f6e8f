//! Stock status definitions for book records
//!
//! The labels are part of the flat-file contract and must not change.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock status of a book as reported by its detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Availability {
    /// Detail page reports copies on hand
    InStock,

    /// Detail page reports the book as unavailable
    OutOfStock,

    /// Detail page missing, unreadable, or silent about stock
    #[default]
    Unknown,
}

impl Availability {
    /// Returns true if copies can be ordered
    pub fn is_in_stock(&self) -> bool {
        matches!(self, Self::InStock)
    }

    /// Returns true if the status came from a fallback rather than the page
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Converts the status to its flat-file label
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::OutOfStock => "Out of stock",
            Self::Unknown => "Unknown",
        }
    }

    /// Parses a status from its flat-file label
    ///
    /// Returns None if the string doesn't match any known label.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "In stock" => Some(Self::InStock),
            "Out of stock" => Some(Self::OutOfStock),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all() -> [Self; 3] {
        [Self::InStock, Self::OutOfStock, Self::Unknown]
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

// Serde goes through the label so that files written by other tools with
// unexpected labels still load; anything unrecognized reads as Unknown.
impl From<String> for Availability {
    fn from(label: String) -> Self {
        Self::from_label(label.trim()).unwrap_or(Self::Unknown)
    }
}

impl From<Availability> for String {
    fn from(availability: Availability) -> Self {
        availability.as_label().to_string()
    }
}
