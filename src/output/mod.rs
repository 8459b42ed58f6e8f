//! Output module for writing crawl results and reports
//!
//! This module handles:
//! - Writing book records to the CSV flat file
//! - Computing and printing catalog statistics
//! - Generating markdown summaries of a catalog and its crawl

mod csv_writer;
mod markdown;
pub mod stats;
mod traits;

pub use csv_writer::CsvRecordWriter;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CatalogStatistics, PriceStatistics};
pub use traits::{CrawlSummary, OutputError, OutputResult, RecordWriter};
