//! Markdown summary generation
//!
//! This module generates a human-readable markdown report of a catalog:
//! its statistics and, when written right after a crawl, the run's page
//! failures and field fallbacks.

use crate::output::stats::CatalogStatistics;
use crate::output::traits::{CrawlSummary, OutputResult};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary and writes it to `output_path`
///
/// # Arguments
///
/// * `stats` - Statistics of the catalog
/// * `summary` - The crawl summary, when a crawl just produced the catalog
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    stats: &CatalogStatistics,
    summary: Option<&CrawlSummary>,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(stats, summary);

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats catalog statistics (and optionally a crawl summary) as markdown
pub fn format_markdown_summary(stats: &CatalogStatistics, summary: Option<&CrawlSummary>) -> String {
    let mut md = String::new();

    md.push_str("# Shelfscan Catalog Summary\n\n");

    if let Some(summary) = summary {
        push_run_information(&mut md, summary);
    }

    // Catalog overview
    md.push_str("## Catalog Overview\n\n");
    md.push_str(&format!("- **Total Books**: {}\n", stats.total_books));
    md.push_str(&format!("- **Categories**: {}\n", stats.total_categories));
    md.push_str(&format!(
        "- **Mean Normalized Rating**: {:.3}\n\n",
        stats.mean_normalized_rating
    ));

    // Prices
    md.push_str("## Prices\n\n");
    md.push_str("| Measure | Value |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Mean | {:.2} |\n", stats.price.mean));
    md.push_str(&format!("| Median | {:.2} |\n", stats.price.median));
    md.push_str(&format!("| Min | {:.2} |\n", stats.price.min));
    md.push_str(&format!("| Max | {:.2} |\n", stats.price.max));
    md.push_str(&format!("| Std Dev | {:.2} |\n\n", stats.price.std_dev));

    md.push_str("### Price Bands\n\n");
    md.push_str("| Band | Books |\n");
    md.push_str("|------|-------|\n");
    for (band, count) in &stats.price_bands {
        md.push_str(&format!("| {} | {} |\n", band, count));
    }
    md.push('\n');

    // Ratings
    md.push_str("## Rating Distribution\n\n");
    md.push_str("| Rating | Books |\n");
    md.push_str("|--------|-------|\n");
    for (rating, count) in &stats.rating_distribution {
        md.push_str(&format!("| {} | {} |\n", rating, count));
    }
    md.push('\n');

    // Availability
    md.push_str("## Availability\n\n");
    md.push_str("| Status | Books |\n");
    md.push_str("|--------|-------|\n");
    for (label, count) in &stats.availability {
        md.push_str(&format!("| {} | {} |\n", label, count));
    }
    md.push('\n');

    // Top categories
    if !stats.top_categories.is_empty() {
        md.push_str(&format!(
            "## Top Categories ({})\n\n",
            stats.top_categories.len()
        ));
        for (name, count) in &stats.top_categories {
            md.push_str(&format!("- {} ({} books)\n", name, count));
        }
        md.push('\n');
    }

    md
}

fn push_run_information(md: &mut String, summary: &CrawlSummary) {
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Records**: {}\n", summary.records));
    md.push_str(&format!(
        "- **Fetch Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    md.push_str("## Crawl Breakdown\n\n");
    md.push_str("| Item | Count |\n");
    md.push_str("|------|-------|\n");
    md.push_str(&format!("| Categories | {} |\n", summary.categories_total));
    md.push_str(&format!(
        "| Categories Failed | {} |\n",
        summary.categories_failed
    ));
    md.push_str(&format!("| Listing Pages | {} |\n", summary.listing_pages));
    md.push_str(&format!(
        "| Listing Pages Failed | {} |\n",
        summary.listing_pages_failed
    ));
    md.push_str(&format!(
        "| Detail Pages Failed | {} |\n",
        summary.detail_pages_failed
    ));
    md.push_str(&format!("| Skipped Tiles | {} |\n", summary.skipped_tiles));
    md.push_str(&format!("| Requests | {} |\n", summary.fetch.requests));
    md.push_str(&format!("| Retries | {} |\n\n", summary.fetch.retries));

    if summary.total_fallbacks() > 0 {
        md.push_str("## Field Fallbacks\n\n");
        md.push_str("| Field | Defaulted |\n");
        md.push_str("|-------|-----------|\n");
        md.push_str(&format!("| Price | {} |\n", summary.price_fallbacks));
        md.push_str(&format!("| Rating | {} |\n", summary.rating_fallbacks));
        md.push_str(&format!(
            "| Availability | {} |\n",
            summary.unknown_availability
        ));
        md.push_str(&format!(
            "| Description | {} |\n\n",
            summary.missing_descriptions
        ));
    }
}
