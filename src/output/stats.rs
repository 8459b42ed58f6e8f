//! Statistics over a set of book records
//!
//! This module computes aggregate figures for a catalog (prices, ratings,
//! categories, stock) and prints them for the `--stats` mode.

use crate::model::{Availability, BookRecord};
use std::collections::{BTreeMap, HashMap};

/// Number of categories listed in `top_categories`
pub const TOP_CATEGORY_COUNT: usize = 10;

/// Price bands as `(label, exclusive lower bound, inclusive upper bound)`
pub const PRICE_BANDS: [(&str, f64, f64); 4] = [
    ("budget", 0.0, 20.0),
    ("moderate", 20.0, 40.0),
    ("premium", 40.0, 60.0),
    ("luxury", 60.0, 100.0),
];

/// Summary figures for a price column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceStatistics {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; 0.0 for fewer than two prices
    pub std_dev: f64,
}

impl PriceStatistics {
    pub fn from_prices(prices: &[f64]) -> Self {
        if prices.is_empty() {
            return Self::default();
        }

        let mut sorted = prices.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / count;
        let middle = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[middle - 1] + sorted[middle]) / 2.0
        } else {
            sorted[middle]
        };
        let std_dev = if sorted.len() > 1 {
            let variance =
                sorted.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (count - 1.0);
            variance.sqrt()
        } else {
            0.0
        };

        Self {
            mean,
            median,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std_dev,
        }
    }
}

/// Aggregate statistics for a catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogStatistics {
    pub total_books: u64,
    pub total_categories: u64,
    pub price: PriceStatistics,

    /// Books per rating value, ascending by rating
    pub rating_distribution: BTreeMap<u8, u64>,

    /// Largest categories, count descending then name
    pub top_categories: Vec<(String, u64)>,

    /// Books per price band, in [`PRICE_BANDS`] order
    pub price_bands: Vec<(String, u64)>,

    /// Books per availability label
    pub availability: BTreeMap<String, u64>,

    /// Mean of rating / 5
    pub mean_normalized_rating: f64,
}

impl CatalogStatistics {
    /// Computes statistics over the given records
    ///
    /// An empty slice yields all-zero statistics.
    pub fn from_records(records: &[BookRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }

        let prices: Vec<f64> = records.iter().map(|r| r.price).collect();

        let mut rating_distribution = BTreeMap::new();
        let mut category_counts: HashMap<&str, u64> = HashMap::new();
        let mut availability: BTreeMap<String, u64> = Availability::all()
            .iter()
            .map(|a| (a.as_label().to_string(), 0))
            .collect();

        for record in records {
            *rating_distribution.entry(record.rating).or_insert(0) += 1;
            *category_counts.entry(record.category.as_str()).or_insert(0) += 1;
            *availability
                .entry(record.availability.as_label().to_string())
                .or_insert(0) += 1;
        }

        let total_categories = category_counts.len() as u64;
        let mut top_categories: Vec<(String, u64)> = category_counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        top_categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_categories.truncate(TOP_CATEGORY_COUNT);

        let price_bands = PRICE_BANDS
            .iter()
            .map(|(label, low, high)| {
                let count = prices.iter().filter(|p| **p > *low && **p <= *high).count();
                (label.to_string(), count as u64)
            })
            .collect();

        let mean_normalized_rating =
            records.iter().map(BookRecord::normalized_rating).sum::<f64>() / records.len() as f64;

        Self {
            total_books: records.len() as u64,
            total_categories,
            price: PriceStatistics::from_prices(&prices),
            rating_distribution,
            top_categories,
            price_bands,
            availability,
            mean_normalized_rating,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Overview:");
    println!("  Total books: {}", stats.total_books);
    println!("  Categories: {}", stats.total_categories);
    println!(
        "  Mean normalized rating: {:.3}",
        stats.mean_normalized_rating
    );
    println!();

    println!("Prices:");
    println!("  Mean: {:.2}", stats.price.mean);
    println!("  Median: {:.2}", stats.price.median);
    println!("  Min: {:.2}", stats.price.min);
    println!("  Max: {:.2}", stats.price.max);
    println!("  Std dev: {:.2}", stats.price.std_dev);
    println!();

    println!("Price Bands:");
    for (band, count) in &stats.price_bands {
        println!("  {}: {}", band, count);
    }
    println!();

    println!("Ratings:");
    for (rating, count) in &stats.rating_distribution {
        let percentage = if stats.total_books > 0 {
            (*count as f64 / stats.total_books as f64) * 100.0
        } else {
            0.0
        };
        println!("  {} stars: {} ({:.1}%)", rating, count, percentage);
    }
    println!();

    println!("Availability:");
    for (label, count) in &stats.availability {
        println!("  {}: {}", label, count);
    }
    println!();

    if !stats.top_categories.is_empty() {
        println!("Top Categories ({}):", stats.top_categories.len());
        for (name, count) in &stats.top_categories {
            println!("  - {}: {}", name, count);
        }
    }
}
