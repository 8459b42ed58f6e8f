use crate::model::BookRecord;
use crate::output::CatalogStatistics;
use crate::query::filter::{filter_books, page_of, paginate, search_books, sort_books};
use crate::query::{validate_paging, BookPage, BookQuery, GenreCount, QueryError, QueryResult, SortField};
use std::collections::HashMap;
use std::path::Path;

/// An in-memory, read-only catalog loaded from a crawl's CSV file
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<BookRecord>,
}

impl Catalog {
    /// Loads every row of the CSV at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(Catalog)` - All rows parsed
    /// * `Err(QueryError::Unavailable)` - The file does not exist
    /// * `Err(QueryError::Csv)` - A row could not be read as a record
    pub fn load(path: &Path) -> QueryResult<Self> {
        if !path.exists() {
            return Err(QueryError::Unavailable(format!(
                "{} not found; run a crawl first",
                path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(path)?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<BookRecord>, csv::Error>>()?;

        tracing::info!("Loaded {} books from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<BookRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Filters, sorts and paginates the catalog
    pub fn list(&self, query: &BookQuery) -> QueryResult<BookPage> {
        self.ensure_available()?;
        query.validate()?;

        let mut matches = filter_books(&self.records, query);

        if let Some(name) = query.sort_by.as_deref() {
            match name.parse::<SortField>() {
                Ok(field) => sort_books(&mut matches, field, query.order),
                Err(e) => tracing::warn!("{}, ignoring sort", e),
            }
        }

        paginate(matches, query.page, query.per_page)
    }

    /// Case-insensitive search over titles and descriptions
    pub fn search(&self, term: &str, page: usize, per_page: usize) -> QueryResult<BookPage> {
        self.ensure_available()?;
        validate_paging(page, per_page)?;

        if term.trim().is_empty() {
            return Err(QueryError::InvalidArgument(
                "search term must not be empty".to_string(),
            ));
        }

        Ok(page_of(search_books(&self.records, term), page, per_page))
    }

    /// Every category with its record count, largest first
    pub fn genres(&self) -> QueryResult<Vec<GenreCount>> {
        self.ensure_available()?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.category.as_str()).or_insert(0) += 1;
        }

        let mut genres: Vec<GenreCount> = counts
            .into_iter()
            .map(|(name, count)| GenreCount {
                name: name.to_string(),
                count,
            })
            .collect();
        genres.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Ok(genres)
    }

    /// One page of a single category, matched case-insensitively
    pub fn books_in_genre(&self, genre: &str, page: usize, per_page: usize) -> QueryResult<BookPage> {
        self.ensure_available()?;

        let query = BookQuery {
            category: Some(genre.to_string()),
            page,
            per_page,
            ..BookQuery::default()
        };
        query.validate()?;

        let matches = filter_books(&self.records, &query);
        if matches.is_empty() {
            return Err(QueryError::NotFound(format!("category '{}'", genre)));
        }

        Ok(page_of(matches, page, per_page))
    }

    /// Looks up a single record by id
    pub fn get(&self, id: u64) -> QueryResult<&BookRecord> {
        self.ensure_available()?;

        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| QueryError::NotFound(format!("book with id {}", id)))
    }

    /// Aggregate statistics over the whole catalog
    pub fn statistics(&self) -> QueryResult<CatalogStatistics> {
        self.ensure_available()?;
        Ok(CatalogStatistics::from_records(&self.records))
    }

    fn ensure_available(&self) -> QueryResult<()> {
        if self.records.is_empty() {
            return Err(QueryError::Unavailable("catalog is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Availability;
    use crate::output::{CsvRecordWriter, RecordWriter};
    use crate::query::SortOrder;
    use tempfile::TempDir;

    fn record(id: u64, title: &str, price: f64, rating: u8, category: &str) -> BookRecord {
        BookRecord {
            id,
            title: title.to_string(),
            price,
            availability: if id % 2 == 0 {
                Availability::OutOfStock
            } else {
                Availability::InStock
            },
            availability_copies: if id % 2 == 0 { 0 } else { 5 },
            rating,
            category: category.to_string(),
            product_page_url: format!("https://books.example.com/catalogue/book_{}/index.html", id),
            upc: format!("upc{}", id),
            description: format!("Description of {}", title),
            image_url: String::new(),
            scraped_at: "2024-01-01T00:00:00.000000".to_string(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::from_records(vec![
            record(1, "Book A", 10.0, 1, "Fiction"),
            record(2, "Book B", 20.0, 2, "Fiction"),
            record(3, "Book C", 30.0, 3, "Science"),
            record(4, "Book D", 40.0, 4, "Science"),
            record(5, "Book E", 50.0, 5, "History"),
        ])
    }

    #[test]
    fn test_list_defaults() {
        let page = sample_catalog().list(&BookQuery::default()).unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 20);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.books.len(), 5);
    }

    #[test]
    fn test_list_filter_and_sort() {
        let query = BookQuery {
            min_price: Some(20.0),
            sort_by: Some("rating".to_string()),
            order: SortOrder::Desc,
            ..BookQuery::default()
        };
        let page = sample_catalog().list(&query).unwrap();

        let ids: Vec<u64> = page.books.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2]);
    }

    #[test]
    fn test_list_ignores_unknown_sort_field() {
        let query = BookQuery {
            sort_by: Some("publisher".to_string()),
            order: SortOrder::Desc,
            ..BookQuery::default()
        };
        let page = sample_catalog().list(&query).unwrap();

        let ids: Vec<u64> = page.books.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_list_page_out_of_range() {
        let query = BookQuery {
            page: 2,
            per_page: 5,
            ..BookQuery::default()
        };
        assert!(matches!(
            sample_catalog().list(&query),
            Err(QueryError::PageOutOfRange { .. })
        ));
    }

    #[test]
    fn test_search() {
        let catalog = sample_catalog();

        let page = catalog.search("book c", 1, 20).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.books[0].id, 3);

        let page = catalog.search("DESCRIPTION", 1, 2).unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        assert!(matches!(
            catalog.search("  ", 1, 20),
            Err(QueryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_search_past_last_page_is_empty() {
        let page = sample_catalog().search("book a", 5, 20).unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.page, 5);
        assert_eq!(page.total_pages, 1);
        assert!(page.books.is_empty());
    }

    #[test]
    fn test_genres() {
        let genres = sample_catalog().genres().unwrap();
        let names: Vec<(&str, usize)> = genres.iter().map(|g| (g.name.as_str(), g.count)).collect();
        assert_eq!(names, vec![("Fiction", 2), ("Science", 2), ("History", 1)]);
    }

    #[test]
    fn test_books_in_genre() {
        let catalog = sample_catalog();

        let page = catalog.books_in_genre("SCIENCE", 1, 20).unwrap();
        assert_eq!(page.total, 2);
        assert!(page.books.iter().all(|b| b.category == "Science"));

        assert!(matches!(
            catalog.books_in_genre("Poetry", 1, 20),
            Err(QueryError::NotFound(_))
        ));
    }

    #[test]
    fn test_books_in_genre_past_last_page_is_empty() {
        let page = sample_catalog().books_in_genre("fiction", 5, 20).unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.total_pages, 1);
        assert!(page.books.is_empty());
    }

    #[test]
    fn test_get() {
        let catalog = sample_catalog();
        assert_eq!(catalog.get(3).unwrap().title, "Book C");
        assert!(matches!(catalog.get(99), Err(QueryError::NotFound(_))));
    }

    #[test]
    fn test_statistics() {
        let stats = sample_catalog().statistics().unwrap();
        assert_eq!(stats.total_books, 5);
        assert_eq!(stats.total_categories, 3);
        assert!((stats.price.mean - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_catalog_is_unavailable() {
        let catalog = Catalog::default();
        assert!(matches!(catalog.statistics(), Err(QueryError::Unavailable(_))));
        assert!(matches!(
            catalog.list(&BookQuery::default()),
            Err(QueryError::Unavailable(_))
        ));
        assert!(matches!(catalog.genres(), Err(QueryError::Unavailable(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Catalog::load(&dir.path().join("missing.csv")),
            Err(QueryError::Unavailable(_))
        ));
    }

    #[test]
    fn test_load_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.csv");
        let catalog = sample_catalog();
        CsvRecordWriter::new(&path)
            .write_records(catalog.records())
            .unwrap();

        let loaded = Catalog::load(&path).unwrap();
        assert_eq!(loaded.len(), 5);
        assert_eq!(loaded.records(), catalog.records());
    }

    #[test]
    fn test_load_malformed_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("books.csv");
        std::fs::write(
            &path,
            "id,title,price,availability,availability_copies,rating,category,product_page_url,upc,description,image_url,scraped_at\n\
             x,Bad,free,In stock,1,3,Poetry,u,upc,,i,t\n",
        )
        .unwrap();

        assert!(matches!(Catalog::load(&path), Err(QueryError::Csv(_))));
    }
}
