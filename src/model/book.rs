use crate::model::Availability;
use serde::{Deserialize, Serialize};
use url::Url;

/// Column order of the flat file; matches the field order of [`BookRecord`]
pub const COLUMNS: [&str; 12] = [
    "id",
    "title",
    "price",
    "availability",
    "availability_copies",
    "rating",
    "category",
    "product_page_url",
    "upc",
    "description",
    "image_url",
    "scraped_at",
];

/// A category link taken from the site navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRef {
    /// Display name, whitespace-trimmed
    pub name: String,

    /// First listing page of the category
    pub listing_url: Url,
}

/// One book tile from a category listing page
#[derive(Debug, Clone, PartialEq)]
pub struct BookSummary {
    pub title: String,

    /// Price with the currency symbol stripped; 0.0 when unreadable
    pub price: f64,

    /// Star rating 1-5; 0 when the rating class is missing or unknown
    pub rating: u8,

    pub detail_url: Url,

    /// Absolute cover URL, empty when the tile has no image
    pub cover_image_url: String,
}

/// Fields only available on a book's detail page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailFields {
    pub upc: String,
    pub availability: Availability,
    pub availability_copies: u32,
    pub description: String,
}

/// A fully enriched book that has not been numbered yet
///
/// Ids are only handed out once the whole crawl has finished, so the crawl
/// accumulates these and the coordinator converts them in a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedBook {
    pub title: String,
    pub price: f64,
    pub availability: Availability,
    pub availability_copies: u32,
    pub rating: u8,
    pub category: String,
    pub product_page_url: String,
    pub upc: String,
    pub description: String,
    pub image_url: String,
    pub scraped_at: String,
}

impl ScrapedBook {
    /// Merges a listing tile with its detail page fields
    ///
    /// `None` for `detail` means the detail page could not be fetched; the
    /// record is kept with empty UPC/description and Unknown availability.
    pub fn from_parts(
        summary: BookSummary,
        category: &str,
        detail: Option<DetailFields>,
        scraped_at: &str,
    ) -> Self {
        let detail = detail.unwrap_or_default();

        Self {
            title: summary.title,
            price: summary.price,
            availability: detail.availability,
            // Copies are only meaningful while in stock
            availability_copies: if detail.availability.is_in_stock() {
                detail.availability_copies
            } else {
                0
            },
            rating: summary.rating,
            category: category.to_string(),
            product_page_url: summary.detail_url.to_string(),
            upc: detail.upc,
            description: detail.description,
            image_url: summary.cover_image_url,
            scraped_at: scraped_at.to_string(),
        }
    }

    /// Assigns the record its final id
    pub fn into_record(self, id: u64) -> BookRecord {
        BookRecord {
            id,
            title: self.title,
            price: self.price,
            availability: self.availability,
            availability_copies: self.availability_copies,
            rating: self.rating,
            category: self.category,
            product_page_url: self.product_page_url,
            upc: self.upc,
            description: self.description,
            image_url: self.image_url,
            scraped_at: self.scraped_at,
        }
    }
}

/// The persisted unit: one row of the flat file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub availability: Availability,
    pub availability_copies: u32,
    pub rating: u8,
    pub category: String,
    pub product_page_url: String,
    pub upc: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    pub scraped_at: String,
}

impl BookRecord {
    /// Rating scaled to 0.0-1.0
    pub fn normalized_rating(&self) -> f64 {
        f64::from(self.rating) / 5.0
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// Numbers books 1..=N in the order they were collected
pub fn assign_ids(books: Vec<ScrapedBook>) -> Vec<BookRecord> {
    books
        .into_iter()
        .zip(1u64..)
        .map(|(book, id)| book.into_record(id))
        .collect()
}
