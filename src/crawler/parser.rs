//! HTML parser for the catalog's three page kinds
//!
//! This module extracts:
//! - Category links from the site navigation (category index)
//! - Book tiles and the "next page" link (listing pages)
//! - UPC, availability and description (detail pages)
//!
//! All functions are pure: markup in, structured data out. Missing markup
//! yields empty results or field defaults rather than errors, and every
//! field-level fallback is logged so data quality problems stay visible.

use crate::model::{Availability, BookSummary, CategoryRef, DetailFields};
use crate::url::{catalogue_url, media_url, resolve_against};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use url::Url;

/// Currency symbols stripped before parsing a price.
/// `Â` shows up when a `£` encoded as UTF-8 is decoded as Latin-1.
const CURRENCY_SYMBOLS: &[char] = &['£', '€', '$', 'Â'];

/// Parsed content of one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Book tiles in page order
    pub books: Vec<BookSummary>,

    /// Absolute URL of the next listing page, if the page links one
    pub next_page: Option<Url>,

    /// Tiles whose price text could not be read (recorded as 0.0)
    pub price_fallbacks: u64,

    /// Tiles whose rating class was missing or unknown (recorded as 0)
    pub rating_fallbacks: u64,

    /// Tiles dropped because they had no title or no detail link
    pub skipped_tiles: u64,
}

/// Extracts every category from the navigation block of the index page
///
/// The nested list under `ul.nav-list` holds the categories; the outer item
/// (the implicit "all books" root) is skipped. Returns an empty list when
/// the navigation is absent.
///
/// # Example
///
/// ```
/// use scraper::Html;
/// use shelfscan::crawler::parse_category_index;
/// use url::Url;
///
/// let html = r#"<ul class="nav nav-list"><li><a href="catalogue/category/books_1/index.html">Books</a>
///   <ul><li><a href="catalogue/category/books/travel_2/index.html"> Travel </a></li></ul></li></ul>"#;
/// let base = Url::parse("https://books.example.com/").unwrap();
/// let categories = parse_category_index(&Html::parse_document(html), &base);
/// assert_eq!(categories.len(), 1);
/// assert_eq!(categories[0].name, "Travel");
/// ```
pub fn parse_category_index(document: &Html, base_url: &Url) -> Vec<CategoryRef> {
    let Ok(link_selector) = Selector::parse("ul.nav-list > li > ul > li > a[href]") else {
        return Vec::new();
    };

    let mut categories = Vec::new();
    for link in document.select(&link_selector) {
        let name = element_text(&link);
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        if name.is_empty() {
            tracing::warn!("Skipping category link without a name: {}", href);
            continue;
        }

        match resolve_against(base_url, href) {
            Ok(listing_url) => categories.push(CategoryRef { name, listing_url }),
            Err(e) => tracing::warn!("Skipping category '{}' with bad link {}: {}", name, href, e),
        }
    }

    if categories.is_empty() {
        tracing::warn!("No categories found in navigation of {}", base_url);
    }

    categories
}

/// Extracts the book tiles and next-page link from a listing page
///
/// # Arguments
///
/// * `document` - The parsed listing page
/// * `page_url` - URL the page was fetched from (next links are relative to it)
/// * `base_url` - Site root (detail and image links are rebased onto it)
pub fn parse_listing_page(document: &Html, page_url: &Url, base_url: &Url) -> ListingPage {
    let mut page = ListingPage {
        next_page: find_next_page(document, page_url),
        ..ListingPage::default()
    };

    let Ok(tile_selector) = Selector::parse("article.product_pod") else {
        return page;
    };

    for (index, tile) in document.select(&tile_selector).enumerate() {
        match parse_tile(&tile, base_url) {
            Some(parsed) => {
                if parsed.price_defaulted {
                    page.price_fallbacks += 1;
                }
                if parsed.rating_defaulted {
                    page.rating_fallbacks += 1;
                }
                page.books.push(parsed.summary);
            }
            None => {
                tracing::warn!("Skipping book tile {} on {}", index + 1, page_url);
                page.skipped_tiles += 1;
            }
        }
    }

    page
}

/// Returns the absolute URL behind the page's `li.next` link, if any
///
/// Its absence is the only signal that a category has no more pages.
pub fn find_next_page(document: &Html, page_url: &Url) -> Option<Url> {
    let selector = Selector::parse("li.next > a[href]").ok()?;
    let href = document.select(&selector).next()?.value().attr("href")?;

    match resolve_against(page_url, href) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("Ignoring unusable next link {} on {}: {}", href, page_url, e);
            None
        }
    }
}

/// Extracts UPC, availability and description from a book's detail page
///
/// Fields that cannot be found keep their defaults: empty UPC, `Unknown`
/// availability with 0 copies, empty description.
pub fn parse_detail_page(document: &Html) -> DetailFields {
    let mut detail = DetailFields::default();

    if let (Ok(row_selector), Ok(th_selector), Ok(td_selector)) = (
        Selector::parse("table.table-striped tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) {
        for row in document.select(&row_selector) {
            let header = row.select(&th_selector).next().map(|th| element_text(&th));
            let value = row.select(&td_selector).next().map(|td| element_text(&td));

            match (header.as_deref(), value) {
                (Some("UPC"), Some(value)) => detail.upc = value,
                (Some("Availability"), Some(value)) => {
                    let (availability, copies) = parse_availability(&value);
                    detail.availability = availability;
                    detail.availability_copies = copies;
                }
                _ => {}
            }
        }
    }

    if detail.upc.is_empty() {
        tracing::debug!("Detail page has no UPC row");
    }

    detail.description = parse_description(document).unwrap_or_default();
    detail
}

/// Reads the paragraph that follows the `#product_description` anchor
fn parse_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("#product_description ~ p").ok()?;
    let text = element_text(&document.select(&selector).next()?);
    (!text.is_empty()).then_some(text)
}

/// Parses an availability string such as `"In stock (22 available)"`
///
/// | Input | Result |
/// |-------|--------|
/// | contains `In stock` | `InStock`, copies from `(N available)` or 0 |
/// | contains `Out of stock` | `OutOfStock`, 0 |
/// | empty, unrecognized, or copy count overflow | `Unknown`, 0 |
pub fn parse_availability(text: &str) -> (Availability, u32) {
    let text = text.trim();

    if text.contains("In stock") {
        let Some(captures) = copies_pattern().and_then(|pattern| pattern.captures(text)) else {
            return (Availability::InStock, 0);
        };
        return match captures[1].parse::<u32>() {
            Ok(copies) => (Availability::InStock, copies),
            Err(e) => {
                tracing::warn!("Unreadable copy count in '{}': {}", text, e);
                (Availability::Unknown, 0)
            }
        };
    }

    if text.to_lowercase().contains("out of stock") {
        return (Availability::OutOfStock, 0);
    }

    tracing::warn!("Unrecognized availability text '{}'", text);
    (Availability::Unknown, 0)
}

fn copies_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\((\d+) available\)").ok())
        .as_ref()
}

/// Parses price text such as `"£51.77"`, returning 0.0 when unreadable
pub fn parse_price(text: &str) -> f64 {
    try_parse_price(text).unwrap_or_else(|| {
        tracing::warn!("Unreadable price '{}', recording 0.0", text);
        0.0
    })
}

/// Strict price parse: None unless the text is a finite, non-negative number
pub fn try_parse_price(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c))
        .collect();

    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Maps a star-rating class token to its value; unknown tokens map to 0
pub fn rating_from_token(token: &str) -> u8 {
    match token {
        "One" => 1,
        "Two" => 2,
        "Three" => 3,
        "Four" => 4,
        "Five" => 5,
        _ => 0,
    }
}

/// A tile plus which of its fields fell back to defaults
struct ParsedTile {
    summary: BookSummary,
    price_defaulted: bool,
    rating_defaulted: bool,
}

fn parse_tile(tile: &ElementRef, base_url: &Url) -> Option<ParsedTile> {
    let link_selector = Selector::parse("h3 a[href]").ok()?;
    let link = tile.select(&link_selector).next()?;

    // The visible text is truncated with "..." on long titles; the title
    // attribute holds the full one.
    let title = link
        .value()
        .attr("title")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| element_text(&link));
    if title.is_empty() {
        return None;
    }

    let href = link.value().attr("href")?;
    let detail_url = match catalogue_url(base_url, href) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("Unusable detail link '{}' for '{}': {}", href, title, e);
            return None;
        }
    };

    let price_text = Selector::parse("p.price_color")
        .ok()
        .and_then(|selector| tile.select(&selector).next().map(|p| element_text(&p)));
    let price = price_text.as_deref().and_then(try_parse_price);
    if price.is_none() {
        tracing::warn!(
            "Unreadable price {:?} for '{}', recording 0.0",
            price_text.as_deref().unwrap_or(""),
            title
        );
    }

    let rating = tile_rating(tile);
    if rating == 0 {
        tracing::warn!("Missing or unknown star rating for '{}', recording 0", title);
    }

    let cover_image_url = Selector::parse("img[src]")
        .ok()
        .and_then(|selector| tile.select(&selector).next())
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| media_url(base_url, src).ok())
        .map(|url| url.to_string())
        .unwrap_or_default();

    Some(ParsedTile {
        summary: BookSummary {
            title,
            price: price.unwrap_or(0.0),
            rating,
            detail_url,
            cover_image_url,
        },
        price_defaulted: price.is_none(),
        rating_defaulted: rating == 0,
    })
}

/// Reads the rating from `<p class="star-rating Three">`
fn tile_rating(tile: &ElementRef) -> u8 {
    let Ok(selector) = Selector::parse("p.star-rating") else {
        return 0;
    };

    tile.select(&selector)
        .next()
        .and_then(|p| p.value().classes().find(|class| *class != "star-rating"))
        .map_or(0, rating_from_token)
}

/// Collects an element's text with surrounding whitespace removed
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
