//! Pagination walker
//!
//! Follows a category's "next" links from its first listing page until a
//! page has none, enriching every tile along the way.

use crate::crawler::enrich::enrich_book;
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::parse_listing_page;
use crate::model::{CategoryRef, ScrapedBook};
use scraper::Html;
use url::Url;

/// Timestamp format of the `scraped_at` column (UTC, microseconds)
pub const SCRAPED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Everything a walk over one category produced
#[derive(Debug, Clone, Default)]
pub struct CategoryCrawl {
    /// Enriched books in listing order
    pub books: Vec<ScrapedBook>,

    /// Listing pages fetched, in visiting order
    pub pages_visited: Vec<Url>,

    /// Listing page whose fetch failed and ended the walk early
    pub failed_page: Option<Url>,

    pub detail_failures: u64,
    pub price_fallbacks: u64,
    pub rating_fallbacks: u64,
    pub skipped_tiles: u64,
}

impl CategoryCrawl {
    /// True when the category yielded no books at all
    ///
    /// Covers a first listing page that could not be fetched as well as
    /// listing pages that were fetched but held no parseable tile.
    pub fn is_failed(&self) -> bool {
        self.books.is_empty()
    }
}

/// Walks one category's listing pages in order
pub struct CategoryWalker<'a> {
    category: &'a CategoryRef,
    base_url: &'a Url,
    current_url: Option<Url>,
    page_number: u32,
}

impl<'a> CategoryWalker<'a> {
    pub fn new(category: &'a CategoryRef, base_url: &'a Url) -> Self {
        Self {
            category,
            base_url,
            current_url: Some(category.listing_url.clone()),
            page_number: 1,
        }
    }

    /// Page number of the listing page the walker will fetch next
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Runs the walk to completion
    ///
    /// A failed listing fetch stops the walk; whatever was collected before
    /// it is returned. The absence of a next link is the only other stop.
    pub async fn walk(mut self, fetcher: &mut Fetcher) -> CategoryCrawl {
        let mut crawl = CategoryCrawl::default();

        while let Some(page_url) = self.current_url.take() {
            tracing::info!(
                "Category '{}': page {} ({})",
                self.category.name,
                self.page_number,
                page_url
            );

            let (final_url, body) = match fetcher.fetch(&page_url).await {
                FetchResult::Success {
                    final_url, body, ..
                } => (final_url, body),
                failure => {
                    tracing::error!(
                        "Listing page {} of '{}' failed: {}",
                        page_url,
                        self.category.name,
                        failure.failure_reason().unwrap_or_default()
                    );
                    crawl.failed_page = Some(page_url);
                    break;
                }
            };

            let scraped_at = chrono::Utc::now().format(SCRAPED_AT_FORMAT).to_string();
            let listing = {
                let document = Html::parse_document(&body);
                parse_listing_page(&document, &final_url, self.base_url)
            };

            crawl.pages_visited.push(page_url);
            crawl.price_fallbacks += listing.price_fallbacks;
            crawl.rating_fallbacks += listing.rating_fallbacks;
            crawl.skipped_tiles += listing.skipped_tiles;

            if listing.books.is_empty() {
                tracing::warn!(
                    "No books on page {} of '{}'",
                    self.page_number,
                    self.category.name
                );
            }

            for summary in listing.books {
                let enriched =
                    enrich_book(fetcher, summary, &self.category.name, &scraped_at).await;
                if !enriched.detail_fetched {
                    crawl.detail_failures += 1;
                }
                crawl.books.push(enriched.book);
            }

            if let Some(next) = listing.next_page {
                self.current_url = Some(next);
                self.page_number += 1;
            }
        }

        tracing::info!(
            "Category '{}' done: {} books from {} page(s)",
            self.category.name,
            crawl.books.len(),
            crawl.pages_visited.len()
        );

        crawl
    }
}
