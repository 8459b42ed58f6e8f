//! Read-only queries over a crawled catalog file
//!
//! This module loads the CSV a crawl produced into memory and answers:
//! - Filtered, sorted and paginated listings
//! - Title/description search
//! - Genre listings and per-genre pages
//! - Single-book lookup by id
//! - Aggregate statistics

mod catalog;
mod filter;

pub use catalog::Catalog;
pub use filter::{filter_books, page_of, paginate, search_books, sort_books};

use crate::model::BookRecord;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default page size for listings
pub const DEFAULT_PER_PAGE: usize = 20;

/// Largest page size a listing accepts
pub const MAX_PER_PAGE: usize = 100;

/// Errors that can occur while querying a catalog
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Catalog data not available: {0}")]
    Unavailable(String),

    #[error("Failed to read catalog: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Page {page} is beyond the last page ({total_pages})")]
    PageOutOfRange { page: usize, total_pages: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown sort field: {0}")]
    UnknownSortField(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Columns a listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Price,
    Rating,
    Category,
    AvailabilityCopies,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Price => "price",
            Self::Rating => "rating",
            Self::Category => "category",
            Self::AvailabilityCopies => "availability_copies",
        }
    }
}

impl FromStr for SortField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Self::Id),
            "title" => Ok(Self::Title),
            "price" => Ok(Self::Price),
            "rating" => Ok(Self::Rating),
            "category" => Ok(Self::Category),
            "availability_copies" => Ok(Self::AvailabilityCopies),
            other => Err(QueryError::UnknownSortField(other.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(QueryError::InvalidArgument(format!(
                "sort order must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// Parameters of a listing query
#[derive(Debug, Clone, PartialEq)]
pub struct BookQuery {
    /// Category name, compared case-insensitively
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<u8>,

    /// Sort column name; unknown names are ignored
    pub sort_by: Option<String>,
    pub order: SortOrder,

    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
}

impl Default for BookQuery {
    fn default() -> Self {
        Self {
            category: None,
            min_price: None,
            max_price: None,
            min_rating: None,
            sort_by: None,
            order: SortOrder::Asc,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl BookQuery {
    /// Checks ranges the listing relies on
    pub fn validate(&self) -> QueryResult<()> {
        validate_paging(self.page, self.per_page)?;

        for (name, value) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(price) = value {
                if price.is_nan() || price < 0.0 {
                    return Err(QueryError::InvalidArgument(format!(
                        "{} must be non-negative, got {}",
                        name, price
                    )));
                }
            }
        }

        if let Some(rating) = self.min_rating {
            if !(1..=5).contains(&rating) {
                return Err(QueryError::InvalidArgument(format!(
                    "min_rating must be between 1 and 5, got {}",
                    rating
                )));
            }
        }

        Ok(())
    }
}

/// One page of query results
#[derive(Debug, Clone, PartialEq)]
pub struct BookPage {
    /// Matches across all pages
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub books: Vec<BookRecord>,
}

/// A category and how many records it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreCount {
    pub name: String,
    pub count: usize,
}

pub(crate) fn validate_paging(page: usize, per_page: usize) -> QueryResult<()> {
    if page == 0 {
        return Err(QueryError::InvalidArgument(
            "page numbers start at 1".to_string(),
        ));
    }
    if per_page == 0 || per_page > MAX_PER_PAGE {
        return Err(QueryError::InvalidArgument(format!(
            "per_page must be between 1 and {}, got {}",
            MAX_PER_PAGE, per_page
        )));
    }
    Ok(())
}
