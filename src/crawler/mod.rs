//! Crawler module for catalog fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry, backoff and a politeness delay
//! - Parsing of category index, listing and detail pages
//! - Walking each category's paginated listing
//! - Overall crawl coordination and record numbering

mod coordinator;
mod enrich;
mod fetcher;
mod parser;
mod walker;

pub use coordinator::{run_crawl, Coordinator};
pub use enrich::{enrich_book, Enriched};
pub use fetcher::{build_http_client, FetchResult, FetchStats, Fetcher, RetryPolicy};
pub use parser::{
    find_next_page, parse_availability, parse_category_index, parse_detail_page,
    parse_listing_page, parse_price, rating_from_token, try_parse_price, ListingPage,
};
pub use walker::{CategoryCrawl, CategoryWalker, SCRAPED_AT_FORMAT};

use crate::config::Config;
use crate::output::{generate_markdown_summary, CatalogStatistics, CrawlSummary, CsvRecordWriter, RecordWriter};
use crate::ShelfError;
use std::path::Path;

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP session
/// 2. Walk every category of the site
/// 3. Number the collected records
/// 4. Write them to the configured CSV path
/// 5. Write the Markdown summary, if a summary path is configured
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed and output was written
/// * `Err(ShelfError)` - No records were produced or output failed
pub async fn crawl(config: &Config) -> Result<CrawlSummary, ShelfError> {
    let (records, summary) = run_crawl(config).await?;

    let writer = CsvRecordWriter::new(&config.output.csv_path);
    let written = writer.write_records(&records)?;
    tracing::info!("Wrote {} records to {}", written, writer.target().display());

    if let Some(summary_path) = &config.output.summary_path {
        let stats = CatalogStatistics::from_records(&records);
        generate_markdown_summary(&stats, Some(&summary), Path::new(summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(summary)
}
