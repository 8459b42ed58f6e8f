//! Queries over a CSV produced by a real crawl

use crate::fixture::{mount_site, test_config, two_category_site, SiteOptions};
use shelfscan::crawler::crawl;
use shelfscan::query::{BookQuery, QueryError, SortOrder};
use shelfscan::Catalog;
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

async fn crawled_catalog() -> (Catalog, TempDir) {
    let server = MockServer::start().await;
    mount_site(&server, &two_category_site(), &SiteOptions::default()).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    crawl(&config).await.unwrap();

    let catalog = Catalog::load(Path::new(&config.output.csv_path)).unwrap();
    (catalog, dir)
}

#[tokio::test]
async fn test_list_sorted_by_price() {
    let (catalog, _dir) = crawled_catalog().await;

    let query = BookQuery {
        sort_by: Some("price".to_string()),
        order: SortOrder::Desc,
        per_page: 3,
        ..BookQuery::default()
    };
    let page = catalog.list(&query).unwrap();

    assert_eq!(page.total, 7);
    assert_eq!(page.total_pages, 3);
    let titles: Vec<&str> = page.books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Full Moon over Noah’s Ark", "See America", "Sharp Objects"]
    );
}

#[tokio::test]
async fn test_list_filters_by_category_and_rating() {
    let (catalog, _dir) = crawled_catalog().await;

    let query = BookQuery {
        category: Some("travel".to_string()),
        min_rating: Some(3),
        ..BookQuery::default()
    };
    let page = catalog.list(&query).unwrap();

    let ids: Vec<u64> = page.books.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 3, 5]);
}

#[tokio::test]
async fn test_genres_and_lookup() {
    let (catalog, _dir) = crawled_catalog().await;

    let genres = catalog.genres().unwrap();
    assert_eq!(genres[0].name, "Travel");
    assert_eq!(genres[0].count, 5);
    assert_eq!(genres[1].name, "Mystery");

    assert_eq!(catalog.get(6).unwrap().title, "Sharp Objects");
    assert!(matches!(catalog.get(8), Err(QueryError::NotFound(_))));

    let mystery = catalog.books_in_genre("MYSTERY", 1, 20).unwrap();
    assert_eq!(mystery.total, 2);
}

#[tokio::test]
async fn test_search_and_statistics() {
    let (catalog, _dir) = crawled_catalog().await;

    let page = catalog.search("dark", 1, 20).unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.books[0].title, "In a Dark, Dark Wood");

    let stats = catalog.statistics().unwrap();
    assert_eq!(stats.total_books, 7);
    assert_eq!(stats.total_categories, 2);
    assert_eq!(stats.price.min, 19.63);
    assert_eq!(stats.price.max, 49.43);
    assert_eq!(stats.availability.get("Out of stock"), Some(&1));
}
