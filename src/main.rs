//! Page-Harvest main entry point
//!
//! Command-line interface for the news-page dataset pipeline.

use anyhow::Context;
use clap::{Parser, Subcommand};
use page_harvest::config::load_config;
use page_harvest::output::{print_summary, summarize_records};
use page_harvest::{collect_listings, preprocess, run_crawl, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page-Harvest: a news-page dataset crawler
///
/// Page-Harvest crawls configured news sites breadth-first while respecting
/// robots.txt and crawl delays, collects each site's known content-page URLs,
/// and preprocesses the cached bodies into a labeled page-type dataset.
#[derive(Parser, Debug)]
#[command(name = "page-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A news-page dataset crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every configured site and write page_list.jsonl
    Crawl,
    /// Collect known content-page URLs and write content_page_list.jsonl
    Listing,
    /// Build the labeled dataset.jsonl from the crawl and listing outputs
    Preprocess,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;

    match cli.command {
        Command::Crawl => handle_crawl(&config).await,
        Command::Listing => handle_listing(&config).await,
        Command::Preprocess => handle_preprocess(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_harvest=info,warn"),
            1 => EnvFilter::new("page_harvest=debug,info"),
            2 => EnvFilter::new("page_harvest=trace,debug"),
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

/// Handles the `crawl` subcommand
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Sites: {}, max depth: {}, page limit: {}",
        config.site.len(),
        config.crawler.max_depth,
        config.crawler.page_limit
    );

    let records = run_crawl(config)
        .await
        .context("crawl did not complete")?;

    let summary = summarize_records(&records);
    print_summary(&summary);

    Ok(())
}

/// Handles the `listing` subcommand
async fn handle_listing(config: &Config) -> anyhow::Result<()> {
    let entries = collect_listings(config)
        .await
        .context("listing crawl did not complete")?;

    println!("Collected {} content-page URLs", entries.len());

    Ok(())
}

/// Handles the `preprocess` subcommand
async fn handle_preprocess(config: &Config) -> anyhow::Result<()> {
    let rows = preprocess(config)
        .await
        .context("preprocessing did not complete")?;

    let valid = rows.iter().filter(|row| row.valid_page).count();
    println!("Preprocessed {} pages ({} valid)", rows.len(), valid);

    Ok(())
}
