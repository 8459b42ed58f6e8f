//! Filtering, sorting, search and pagination over borrowed records

use crate::model::BookRecord;
use crate::query::{BookPage, BookQuery, QueryError, QueryResult, SortField, SortOrder};
use std::cmp::Ordering;

/// Keeps the records matching every filter set on `query`
///
/// Price and rating bounds are inclusive; the category is compared
/// case-insensitively.
pub fn filter_books<'a>(records: &'a [BookRecord], query: &BookQuery) -> Vec<&'a BookRecord> {
    let category = query.category.as_deref().map(str::to_lowercase);

    records
        .iter()
        .filter(|r| {
            category
                .as_deref()
                .map_or(true, |c| r.category.to_lowercase() == c)
        })
        .filter(|r| query.min_price.map_or(true, |min| r.price >= min))
        .filter(|r| query.max_price.map_or(true, |max| r.price <= max))
        .filter(|r| query.min_rating.map_or(true, |min| r.rating >= min))
        .collect()
}

/// Sorts records in place; equal keys keep their relative order
pub fn sort_books(records: &mut [&BookRecord], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = compare_by(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_by(a: &BookRecord, b: &BookRecord, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Price => a.price.total_cmp(&b.price),
        SortField::Rating => a.rating.cmp(&b.rating),
        SortField::Category => a.category.cmp(&b.category),
        SortField::AvailabilityCopies => a.availability_copies.cmp(&b.availability_copies),
    }
}

/// Records whose title or description contains `term`, ignoring case
pub fn search_books<'a>(records: &'a [BookRecord], term: &str) -> Vec<&'a BookRecord> {
    let term = term.to_lowercase();

    records
        .iter()
        .filter(|r| {
            r.title.to_lowercase().contains(&term) || r.description.to_lowercase().contains(&term)
        })
        .collect()
}

/// Cuts one page out of an ordered result
///
/// A page past the end of a non-empty result is an error; an empty result
/// yields an empty page for any page number.
pub fn paginate(records: Vec<&BookRecord>, page: usize, per_page: usize) -> QueryResult<BookPage> {
    let total = records.len();
    let start = page.saturating_sub(1).saturating_mul(per_page);

    if start >= total && total > 0 {
        return Err(QueryError::PageOutOfRange {
            page,
            total_pages: total.div_ceil(per_page.max(1)),
        });
    }

    Ok(page_of(records, page, per_page))
}

/// Cuts one page out of an ordered result; past the end the page is empty
pub fn page_of(records: Vec<&BookRecord>, page: usize, per_page: usize) -> BookPage {
    let total = records.len();
    let total_pages = total.div_ceil(per_page.max(1));
    let start = page.saturating_sub(1).saturating_mul(per_page);

    let books = records
        .into_iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    BookPage {
        total,
        page,
        per_page,
        total_pages,
        books,
    }
}
