//! Detail page enrichment
//!
//! Turns a listing tile into a full book by fetching its detail page. A
//! failed detail fetch degrades the book instead of dropping it.

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::parse_detail_page;
use crate::model::{BookSummary, ScrapedBook};
use scraper::Html;

/// An enriched book plus whether its detail page was actually read
#[derive(Debug, Clone)]
pub struct Enriched {
    pub book: ScrapedBook,
    pub detail_fetched: bool,
}

/// Fetches the tile's detail page and merges its fields into a book
///
/// # Arguments
///
/// * `fetcher` - The crawl's fetcher
/// * `summary` - The listing tile
/// * `category` - Category the tile was listed under
/// * `scraped_at` - Time the tile's listing page was fetched
pub async fn enrich_book(
    fetcher: &mut Fetcher,
    summary: BookSummary,
    category: &str,
    scraped_at: &str,
) -> Enriched {
    let result = fetcher.fetch(&summary.detail_url).await;

    let detail = match &result {
        FetchResult::Success { body, .. } => {
            let document = Html::parse_document(body);
            Some(parse_detail_page(&document))
        }
        failure => {
            tracing::error!(
                "Detail page {} for '{}' failed: {}",
                summary.detail_url,
                summary.title,
                failure.failure_reason().unwrap_or_default()
            );
            None
        }
    };

    let detail_fetched = detail.is_some();
    Enriched {
        book: ScrapedBook::from_parts(summary, category, detail, scraped_at),
        detail_fetched,
    }
}
