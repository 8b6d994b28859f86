//! ecomm-crawler main entry point
//!
//! This is the command-line interface for the category-tree crawler.

use anyhow::Context;
use clap::Parser;
use ecomm_crawler::config::{load_config_with_hash, Config, SiteProfile};
use ecomm_crawler::crawler::run_crawl;
use ecomm_crawler::output::{generate_markdown_summary, load_statistics, print_statistics};
use ecomm_crawler::storage::open_store;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ecomm-crawler: maps the category tree and product listings of a shop
///
/// Starting from the configured top-level categories of a site, the crawler
/// descends through subcategories, pages through product listings and stores
/// the resulting tree.
#[derive(Parser, Debug)]
#[command(name = "ecomm-crawler")]
#[command(version)]
#[command(about = "Crawls e-commerce category trees", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Identifier of the configured site to crawl
    #[arg(value_name = "SITE", required_unless_present_any = ["stats", "export_summary"])]
    site: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics of the stored tree and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Write a markdown outline of the stored tree to PATH and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    export_summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.stats {
        handle_stats(&config)
    } else if let Some(path) = &cli.export_summary {
        handle_export_summary(&config, path)
    } else {
        let site = cli.site.as_deref().context("No site given")?;
        if cli.dry_run {
            handle_dry_run(&config, site)
        } else {
            handle_crawl(&config, site).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ecomm_crawler=info,warn"),
            1 => EnvFilter::new("ecomm_crawler=debug,info"),
            2 => EnvFilter::new("ecomm_crawler=trace,debug"),
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

/// Handles the --dry-run mode: resolves the site and shows what would be crawled
fn handle_dry_run(config: &Config, site_id: &str) -> anyhow::Result<()> {
    let site = SiteProfile::from_config(config, site_id)?;

    println!("=== ecomm-crawler Dry Run ===\n");

    println!("Site: {}", site.id);
    println!("  Base URL: {}", site.base_url);
    println!("  Max subcategory depth: {}", site.max_subcategory_depth);
    println!("  Max pages per category: {}", site.max_pages_per_category);
    if site.ignore_classes.is_empty() {
        println!("  Ignore classes: none");
    } else {
        let mut classes: Vec<&str> = site.ignore_classes.iter().map(String::as_str).collect();
        classes.sort_unstable();
        println!("  Ignore classes: {}", classes.join(", "));
    }

    println!("\nTop-level categories ({}):", site.categories.len());
    for (name, url) in &site.categories {
        println!("  - {} -> {}", name, url);
    }

    println!("\nCrawler:");
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    match config.crawler.run_timeout_secs {
        Some(secs) => println!("  Run deadline: {}s", secs),
        None => println!("  Run deadline: none"),
    }
    println!(
        "  On fetch error: {}",
        if config.crawler.skip_failed_branches {
            "skip branch"
        } else {
            "abort run"
        }
    );

    println!("\nOutput:");
    println!(
        "  Store: {} ({:?})",
        config.output.data_path, config.output.format
    );

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics of the stored tree
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Store: {}\n", config.output.data_path);

    let store = open_store(&config.output)?;
    let data = store.load()?;

    print_statistics(&load_statistics(&data));
    Ok(())
}

/// Handles the --export-summary mode: writes a markdown outline
fn handle_export_summary(config: &Config, path: &std::path::Path) -> anyhow::Result<()> {
    let store = open_store(&config.output)?;
    let data = store.load()?;

    generate_markdown_summary(&data, path)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;

    println!("✓ Summary exported to: {}", path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, site_id: &str) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of site '{}'", site_id);

    match run_crawl(config, site_id).await {
        Ok(stats) => {
            tracing::info!(
                "Crawl completed successfully: {} products in {} listing pages, {} items ignored, {} skipped, {} without a link, {} branches failed",
                stats.products_appended,
                stats.listing_pages,
                stats.items_ignored,
                stats.items_skipped,
                stats.items_unlinked,
                stats.branches_failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
