//! End-to-end crawl tests against the fixture site

use crate::fixture::{mount_site, test_config, two_category_site, FixtureBook, FixtureCategory, SiteOptions};
use shelfscan::crawler::{crawl, run_crawl};
use shelfscan::{Availability, BookRecord, Catalog, ShelfError};
use std::path::Path;
use tempfile::TempDir;
use wiremock::MockServer;

fn load_records(path: &str) -> Vec<BookRecord> {
    Catalog::load(Path::new(path)).unwrap().records().to_vec()
}

#[tokio::test]
async fn test_full_crawl_two_categories() {
    let server = MockServer::start().await;
    let site = two_category_site();
    let options = SiteOptions {
        verify_counts: true,
        ..SiteOptions::default()
    };
    mount_site(&server, &site, &options).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let summary = crawl(&config).await.unwrap();

    let records = load_records(&config.output.csv_path);
    let expected_total: usize = site.iter().map(FixtureCategory::book_count).sum();
    assert_eq!(records.len(), expected_total);

    // Ids are contiguous and follow crawl order
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=expected_total as u64).collect::<Vec<_>>());

    let categories: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(
        categories,
        vec!["Travel", "Travel", "Travel", "Travel", "Travel", "Mystery", "Mystery"]
    );
    assert_eq!(records[0].title, "It's Only the Himalayas");
    assert_eq!(records[4].title, "Under the Tuscan Sun");
    assert_eq!(records[6].title, "In a Dark, Dark Wood");

    assert_eq!(summary.categories_total, 2);
    assert_eq!(summary.categories_failed, 0);
    assert_eq!(summary.listing_pages, 4);
    assert_eq!(summary.records, 7);
    assert_eq!(summary.detail_pages_failed, 0);
    assert_eq!(summary.fetch.retries, 0);
}

#[tokio::test]
async fn test_records_carry_detail_fields() {
    let server = MockServer::start().await;
    mount_site(&server, &two_category_site(), &SiteOptions::default()).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    crawl(&config).await.unwrap();

    let records = load_records(&config.output.csv_path);
    let himalayas = &records[0];
    assert!((himalayas.price - 45.17).abs() < 1e-9);
    assert_eq!(himalayas.rating, 2);
    assert_eq!(himalayas.availability, Availability::InStock);
    assert_eq!(himalayas.availability_copies, 3);
    assert_eq!(himalayas.upc, "upc-its-only-the-himalayas_981");
    assert_eq!(himalayas.description, "All about It's Only the Himalayas.");
    assert_eq!(
        himalayas.product_page_url,
        format!("{}/catalogue/its-only-the-himalayas_981/index.html", server.uri())
    );
    assert_eq!(
        himalayas.image_url,
        format!("{}/media/cache/its-only-the-himalayas_981.jpg", server.uri())
    );
    assert!(!himalayas.scraped_at.is_empty());

    let see_america = records.iter().find(|r| r.title == "See America").unwrap();
    assert_eq!(see_america.availability, Availability::OutOfStock);
    assert_eq!(see_america.availability_copies, 0);
}

#[tokio::test]
async fn test_failing_category_does_not_block_others() {
    let server = MockServer::start().await;
    let options = SiteOptions {
        broken_categories: vec!["Travel".to_string()],
        ..SiteOptions::default()
    };
    mount_site(&server, &two_category_site(), &options).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let summary = crawl(&config).await.unwrap();

    let records = load_records(&config.output.csv_path);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.category == "Mystery"));
    assert_eq!(records[0].id, 1);

    assert_eq!(summary.categories_failed, 1);
    assert_eq!(summary.listing_pages_failed, 1);
    // One retry for the transient 500
    assert_eq!(summary.fetch.retries, 1);
}

#[tokio::test]
async fn test_missing_detail_page_degrades_record() {
    let server = MockServer::start().await;
    let options = SiteOptions {
        missing_details: vec!["sharp-objects_997".to_string()],
        ..SiteOptions::default()
    };
    mount_site(&server, &two_category_site(), &options).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let (records, summary) = run_crawl(&config).await.unwrap();

    let sharp = records.iter().find(|r| r.title == "Sharp Objects").unwrap();
    assert_eq!(sharp.upc, "");
    assert_eq!(sharp.availability, Availability::Unknown);
    assert_eq!(sharp.availability_copies, 0);
    assert_eq!(sharp.description, "");
    assert!((sharp.price - 47.82).abs() < 1e-9);

    assert_eq!(records.len(), 7);
    assert_eq!(summary.detail_pages_failed, 1);
    assert_eq!(summary.unknown_availability, 1);
    assert_eq!(summary.missing_descriptions, 1);
}

#[tokio::test]
async fn test_cross_listed_book_yields_one_record_per_listing() {
    let server = MockServer::start().await;
    let shared = FixtureBook::new("the-shared-book_1", "The Shared Book", "£10.00", "Five");
    let site = vec![
        FixtureCategory::new("Poetry", "poetry_23", vec![vec![shared.clone()]]),
        FixtureCategory::new("Classics", "classics_6", vec![vec![shared]]),
    ];
    let options = SiteOptions {
        verify_counts: true,
        ..SiteOptions::default()
    };
    mount_site(&server, &site, &options).await;

    let dir = TempDir::new().unwrap();
    let (records, _) = run_crawl(&test_config(&server, dir.path())).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title, records[1].title);
    assert_eq!((records[0].id, records[0].category.as_str()), (1, "Poetry"));
    assert_eq!((records[1].id, records[1].category.as_str()), (2, "Classics"));
}

#[tokio::test]
async fn test_recrawl_overwrites_with_same_content() {
    let server = MockServer::start().await;
    mount_site(&server, &two_category_site(), &SiteOptions::default()).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());

    crawl(&config).await.unwrap();
    let first = without_timestamps(&std::fs::read_to_string(&config.output.csv_path).unwrap());

    crawl(&config).await.unwrap();
    let second = without_timestamps(&std::fs::read_to_string(&config.output.csv_path).unwrap());

    // Header plus seven rows
    assert_eq!(first.lines().count(), 8);
    assert_eq!(first, second);
}

/// Blanks the trailing `scraped_at` column of every row
fn without_timestamps(csv: &str) -> String {
    csv.lines()
        .map(|line| line.rsplit_once(',').map_or(line, |(rest, _)| rest))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_zero_records_is_an_error() {
    let server = MockServer::start().await;
    // An index without category navigation
    mount_site(&server, &[], &SiteOptions::default()).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&server, dir.path());
    let result = crawl(&config).await;

    assert!(matches!(result, Err(ShelfError::NoRecords { categories: 0, .. })));
    assert!(!Path::new(&config.output.csv_path).exists());
}

#[tokio::test]
async fn test_every_category_failing_is_an_error() {
    let server = MockServer::start().await;
    let options = SiteOptions {
        broken_categories: vec!["Travel".to_string(), "Mystery".to_string()],
        ..SiteOptions::default()
    };
    mount_site(&server, &two_category_site(), &options).await;

    let dir = TempDir::new().unwrap();
    let result = crawl(&test_config(&server, dir.path())).await;

    assert!(matches!(
        result,
        Err(ShelfError::NoRecords {
            categories: 2,
            pages_failed: 2
        })
    ));
}

#[tokio::test]
async fn test_crawl_writes_markdown_summary() {
    let server = MockServer::start().await;
    mount_site(&server, &two_category_site(), &SiteOptions::default()).await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&server, dir.path());
    let summary_path = dir.path().join("reports").join("summary.md");
    config.output.summary_path = Some(summary_path.display().to_string());

    crawl(&config).await.unwrap();

    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains("## Run Information"));
    assert!(markdown.contains("- **Total Books**: 7"));
    assert!(markdown.contains("- Travel (5 books)"));
}
