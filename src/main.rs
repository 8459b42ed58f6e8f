//! Shelfscan main entry point
//!
//! This is the command-line interface for crawling a book catalog into a
//! CSV file and querying that file afterwards.

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use shelfscan::config::{load_config_with_hash, validate, Config};
use shelfscan::crawler::crawl;
use shelfscan::output::{generate_markdown_summary, print_statistics};
use shelfscan::query::{BookPage, BookQuery, SortOrder};
use shelfscan::{BookRecord, Catalog};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shelfscan: a polite book catalog crawler
///
/// Without a mode flag, Shelfscan crawls every category of the catalog site
/// and writes one CSV row per listed book. The query modes read that CSV.
#[derive(Parser, Debug)]
#[command(name = "shelfscan")]
#[command(version)]
#[command(about = "A polite book catalog crawler", long_about = None)]
#[command(group(
    ArgGroup::new("mode")
        .args(["dry_run", "stats", "export_summary", "genres", "book", "list", "search"])
        .multiple(false)
))]
struct Cli {
    /// CSV file to write (crawl) or read (query modes) [default: data/books.csv]
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds to wait after each successful request [default: 0.5]
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Retries for transient failures after the first attempt [default: 3]
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Markdown summary file to write after a crawl or with --export-summary
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Show statistics of the CSV and exit
    #[arg(long)]
    stats: bool,

    /// Generate a markdown summary from the CSV and exit
    #[arg(long)]
    export_summary: bool,

    /// List categories with their book counts
    #[arg(long)]
    genres: bool,

    /// Show one book by id
    #[arg(long, value_name = "ID")]
    book: Option<u64>,

    /// List books, filtered, sorted and paginated
    #[arg(long)]
    list: bool,

    /// Search titles and descriptions
    #[arg(long, value_name = "TERM")]
    search: Option<String>,

    /// Only books in this category (case-insensitive); with --list
    #[arg(long, requires = "list")]
    category: Option<String>,

    /// Minimum price, inclusive; with --list
    #[arg(long, requires = "list")]
    min_price: Option<f64>,

    /// Maximum price, inclusive; with --list
    #[arg(long, requires = "list")]
    max_price: Option<f64>,

    /// Minimum rating 1-5, inclusive; with --list
    #[arg(long, requires = "list")]
    min_rating: Option<u8>,

    /// Sort column: id, title, price, rating, category, availability_copies
    #[arg(long, requires = "list")]
    sort: Option<String>,

    /// Sort order: asc or desc
    #[arg(long, default_value = "asc")]
    order: String,

    /// Page number for --list, --search and genre pages
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Results per page (1-100)
    #[arg(long, default_value_t = shelfscan::query::DEFAULT_PER_PAGE)]
    per_page: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let csv_path = PathBuf::from(&config.output.csv_path);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&csv_path)?;
    } else if cli.export_summary {
        handle_export_summary(&config, &csv_path)?;
    } else if cli.genres {
        handle_genres(&csv_path)?;
    } else if let Some(id) = cli.book {
        handle_book(&csv_path, id)?;
    } else if cli.list {
        handle_list(&cli, &csv_path)?;
    } else if let Some(term) = &cli.search {
        handle_search(&csv_path, term, cli.page, cli.per_page)?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelfscan=info,warn"),
            1 => EnvFilter::new("shelfscan=debug,info"),
            2 => EnvFilter::new("shelfscan=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies CLI overrides and re-validates
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.csv_path = output.display().to_string();
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }
    if let Some(retries) = cli.max_retries {
        config.crawler.max_retries = retries;
    }
    if let Some(secs) = cli.delay {
        if !secs.is_finite() || secs < 0.0 {
            bail!("--delay must be a non-negative number of seconds, got {}", secs);
        }
        config.crawler.request_delay_ms = (secs * 1000.0).round() as u64;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Shelfscan Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Max retries: {}", config.crawler.max_retries);
    println!("  Backoff base: {}ms", config.crawler.backoff_base_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("(none)")
    );

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: prints statistics of the CSV
fn handle_stats(csv_path: &Path) -> anyhow::Result<()> {
    println!("Catalog: {}\n", csv_path.display());

    let catalog = Catalog::load(csv_path)?;
    let stats = catalog.statistics()?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: writes a markdown summary of the CSV
fn handle_export_summary(config: &Config, csv_path: &Path) -> anyhow::Result<()> {
    let Some(summary_path) = config.output.summary_path.as_deref() else {
        bail!("No summary path configured; pass --summary <FILE> or set output.summary-path");
    };

    println!("=== Exporting Catalog Summary ===\n");
    println!("Catalog: {}", csv_path.display());
    println!("Output: {}", summary_path);
    println!();

    let catalog = Catalog::load(csv_path)?;
    let stats = catalog.statistics()?;
    generate_markdown_summary(&stats, None, Path::new(summary_path))?;

    println!("✓ Summary exported to: {}", summary_path);

    Ok(())
}

fn handle_genres(csv_path: &Path) -> anyhow::Result<()> {
    let catalog = Catalog::load(csv_path)?;
    let genres = catalog.genres()?;

    println!("Categories ({}):", genres.len());
    for genre in &genres {
        println!("  {:<32} {}", genre.name, genre.count);
    }

    Ok(())
}

fn handle_book(csv_path: &Path, id: u64) -> anyhow::Result<()> {
    let catalog = Catalog::load(csv_path)?;
    let book = catalog.get(id)?;

    println!("#{} {}", book.id, book.title);
    println!("  Category: {}", book.category);
    println!("  Price: {:.2}", book.price);
    println!("  Rating: {}/5", book.rating);
    println!(
        "  Availability: {} ({} copies)",
        book.availability, book.availability_copies
    );
    println!("  UPC: {}", book.upc);
    println!("  Page: {}", book.product_page_url);
    println!("  Image: {}", book.image_url);
    println!("  Scraped at: {}", book.scraped_at);
    if book.has_description() {
        println!("\n{}", book.description);
    }

    Ok(())
}

fn handle_list(cli: &Cli, csv_path: &Path) -> anyhow::Result<()> {
    let query = BookQuery {
        category: cli.category.clone(),
        min_price: cli.min_price,
        max_price: cli.max_price,
        min_rating: cli.min_rating,
        sort_by: cli.sort.clone(),
        order: cli.order.parse::<SortOrder>()?,
        page: cli.page,
        per_page: cli.per_page,
    };

    let catalog = Catalog::load(csv_path)?;
    print_page(&catalog.list(&query)?);

    Ok(())
}

fn handle_search(csv_path: &Path, term: &str, page: usize, per_page: usize) -> anyhow::Result<()> {
    let catalog = Catalog::load(csv_path)?;
    print_page(&catalog.search(term, page, per_page)?);

    Ok(())
}

fn print_page(page: &BookPage) {
    println!(
        "{} books, page {} of {} ({} per page)\n",
        page.total,
        page.page,
        page.total_pages.max(1),
        page.per_page
    );
    for book in &page.books {
        print_row(book);
    }
}

fn print_row(book: &BookRecord) {
    println!(
        "{:>5}  {:>7.2}  {}/5  {:<12}  {:<20}  {}",
        book.id,
        book.price,
        book.rating,
        book.availability.as_label(),
        book.category,
        book.title
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} into {} (delay {}ms, {} retries)",
        config.crawler.base_url,
        config.output.csv_path,
        config.crawler.request_delay_ms,
        config.crawler.max_retries
    );

    match crawl(config).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl completed successfully: {} records, {:.1}% fetch success",
                summary.records,
                summary.success_rate()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
