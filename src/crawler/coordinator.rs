//! Crawler coordinator - main crawl orchestration logic
//!
//! This module drives a whole run:
//! - Fetching and parsing the category index once
//! - Walking every category in navigation order
//! - Accumulating books into one ordered list
//! - Numbering records after the last category
//! - Filling in the crawl summary

use crate::config::Config;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::parse_category_index;
use crate::crawler::walker::{CategoryCrawl, CategoryWalker};
use crate::model::{assign_ids, BookRecord, CategoryRef, ScrapedBook};
use crate::output::CrawlSummary;
use crate::url::parse_base_url;
use crate::ShelfError;
use scraper::Html;
use std::time::Instant;
use url::Url;

/// Main crawler coordinator structure
///
/// Owns the HTTP session and the growing book list for the run's duration.
pub struct Coordinator {
    fetcher: Fetcher,
    base_url: Url,
    books: Vec<ScrapedBook>,
    summary: CrawlSummary,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(ShelfError)` - Bad base URL or HTTP client setup failure
    pub fn new(config: &Config) -> Result<Self, ShelfError> {
        let base_url = parse_base_url(&config.crawler.base_url)?;
        let fetcher = Fetcher::new(&config.crawler, &config.user_agent)?;

        Ok(Self {
            fetcher,
            base_url,
            books: Vec::new(),
            summary: CrawlSummary::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Summary of the run so far
    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    /// Fetches the site root and returns its categories
    ///
    /// A failed fetch is logged and yields no categories.
    pub async fn discover_categories(&mut self) -> Vec<CategoryRef> {
        let index_url = self.base_url.clone();

        match self.fetcher.fetch(&index_url).await {
            FetchResult::Success { body, .. } => {
                let document = Html::parse_document(&body);
                parse_category_index(&document, &self.base_url)
            }
            failure => {
                tracing::error!(
                    "Category index {} failed: {}",
                    index_url,
                    failure.failure_reason().unwrap_or_default()
                );
                Vec::new()
            }
        }
    }

    /// Runs the crawl to completion and returns the numbered records
    ///
    /// Individual pages and categories may fail without stopping the run.
    /// A run that ends with no records at all is an error.
    pub async fn run(&mut self) -> Result<Vec<BookRecord>, ShelfError> {
        let start_time = Instant::now();
        self.summary.started_at = chrono::Utc::now().to_rfc3339();
        tracing::info!("Starting crawl of {}", self.base_url);

        let categories = self.discover_categories().await;
        self.summary.categories_total = categories.len() as u64;
        tracing::info!("Found {} categories", categories.len());

        for (index, category) in categories.iter().enumerate() {
            tracing::info!(
                "Crawling category {}/{}: {}",
                index + 1,
                categories.len(),
                category.name
            );

            let crawl = CategoryWalker::new(category, &self.base_url)
                .walk(&mut self.fetcher)
                .await;
            self.absorb(category, crawl);
        }

        let records = assign_ids(std::mem::take(&mut self.books));
        self.finish(&records, start_time);

        if records.is_empty() {
            return Err(ShelfError::NoRecords {
                categories: categories.len(),
                pages_failed: self.summary.listing_pages_failed,
            });
        }

        Ok(records)
    }

    /// Folds one category's results into the run
    fn absorb(&mut self, category: &CategoryRef, crawl: CategoryCrawl) {
        if crawl.is_failed() {
            tracing::error!("Category '{}' contributed no records", category.name);
            self.summary.categories_failed += 1;
        }

        self.summary.listing_pages += crawl.pages_visited.len() as u64;
        if crawl.failed_page.is_some() {
            self.summary.listing_pages_failed += 1;
        }
        self.summary.detail_pages_failed += crawl.detail_failures;
        self.summary.price_fallbacks += crawl.price_fallbacks;
        self.summary.rating_fallbacks += crawl.rating_fallbacks;
        self.summary.skipped_tiles += crawl.skipped_tiles;

        self.books.extend(crawl.books);
    }

    fn finish(&mut self, records: &[BookRecord], start_time: Instant) {
        let summary = &mut self.summary;
        summary.records = records.len() as u64;
        summary.unknown_availability = records
            .iter()
            .filter(|r| r.availability.is_unknown())
            .count() as u64;
        summary.missing_descriptions = records.iter().filter(|r| !r.has_description()).count() as u64;
        summary.fetch = self.fetcher.stats();
        summary.finished_at = Some(chrono::Utc::now().to_rfc3339());
        summary.duration_seconds = Some(start_time.elapsed().as_secs());

        tracing::info!(
            "Crawl completed: {} records from {} categories in {:?}",
            summary.records,
            summary.categories_total,
            start_time.elapsed()
        );

        let fallbacks = summary.total_fallbacks();
        if fallbacks > 0 {
            tracing::warn!(
                "Field fallbacks: {} price, {} rating, {} unknown availability, {} missing description",
                summary.price_fallbacks,
                summary.rating_fallbacks,
                summary.unknown_availability,
                summary.missing_descriptions
            );
        }
        if summary.total_page_failures() > 0 || summary.categories_failed > 0 {
            tracing::warn!(
                "Failures: {} categories, {} listing pages, {} detail pages",
                summary.categories_failed,
                summary.listing_pages_failed,
                summary.detail_pages_failed
            );
        }
    }
}

/// Runs the main crawl operation
///
/// # Returns
///
/// * `Ok((records, summary))` - Numbered records and the run summary
/// * `Err(ShelfError)` - Setup failed or the run produced no records
///
/// # Example
///
/// ```no_run
/// use shelfscan::config::Config;
/// use shelfscan::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (records, summary) = run_crawl(&Config::default()).await?;
/// println!("{} records, {:.1}% fetch success", records.len(), summary.success_rate());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<(Vec<BookRecord>, CrawlSummary), ShelfError> {
    let mut coordinator = Coordinator::new(config)?;
    let records = coordinator.run().await?;
    Ok((records, coordinator.summary().clone()))
}
