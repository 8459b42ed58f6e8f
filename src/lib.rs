//! Shelfscan: a polite catalog crawler and flat-file book query tool
//!
//! This crate walks a paginated book catalog site category by category,
//! extracts structured book records into a CSV file, and answers filtered,
//! sorted, paginated and aggregated queries over that file.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod query;
pub mod url;

use thiserror::Error;

/// Main error type for Shelfscan operations
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error(
        "Crawl produced no records ({categories} categories, {pages_failed} failed listing pages)"
    )]
    NoRecords { categories: usize, pages_failed: u64 },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Empty link target")]
    Empty,
}

/// Result type alias for Shelfscan operations
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Availability, BookRecord, BookSummary, CategoryRef};
pub use query::Catalog;
