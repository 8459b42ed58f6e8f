//! Output traits and types
//!
//! This module defines the trait interface for record writers and the
//! summary a crawl run produces alongside its records.

use crate::crawler::FetchStats;
use crate::model::BookRecord;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for one crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,

    // Categories and pages
    pub categories_total: u64,
    pub categories_failed: u64,
    pub listing_pages: u64,
    pub listing_pages_failed: u64,
    pub detail_pages_failed: u64,
    pub skipped_tiles: u64,

    // Records and field-level fallbacks
    pub records: u64,
    pub price_fallbacks: u64,
    pub rating_fallbacks: u64,
    pub unknown_availability: u64,
    pub missing_descriptions: u64,

    // HTTP activity
    pub fetch: FetchStats,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Listing and detail pages that ended the run without usable content
    pub fn total_page_failures(&self) -> u64 {
        self.listing_pages_failed + self.detail_pages_failed
    }

    /// Share of page fetches that succeeded, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.fetch.requests == 0 {
            return 0.0;
        }
        (self.fetch.successes as f64 / self.fetch.requests as f64) * 100.0
    }

    /// Total number of field values that fell back to a default
    pub fn total_fallbacks(&self) -> u64 {
        self.price_fallbacks
            + self.rating_fallbacks
            + self.unknown_availability
            + self.missing_descriptions
    }
}

/// Trait for record writers
///
/// A writer persists the complete record set of a run in one call; there is
/// no incremental output.
pub trait RecordWriter {
    /// Writes every record, replacing whatever the target held before
    ///
    /// Returns the number of records written. An empty slice is not an
    /// error: the writer logs a warning and leaves the target untouched.
    fn write_records(&self, records: &[BookRecord]) -> OutputResult<usize>;

    /// Location the writer targets
    fn target(&self) -> &Path;
}
