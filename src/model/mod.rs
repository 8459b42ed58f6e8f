//! Data model for the catalog crawl
//!
//! # Components
//!
//! - `CategoryRef`: a category found in the site navigation
//! - `BookSummary`: one tile of a listing page
//! - `DetailFields`: what a detail page adds to a tile
//! - `ScrapedBook` / `BookRecord`: an enriched book before and after numbering
//! - `Availability`: stock status with its fixed flat-file labels

mod availability;
mod book;

pub use availability::Availability;
pub use book::{assign_ids, BookRecord, BookSummary, CategoryRef, DetailFields, ScrapedBook, COLUMNS};
