//! insta-scraper main entry point
//!
//! This is the command-line interface for scraping Instagram posts through
//! the Apify actor API.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use insta_scraper::apify::ActorInput;
use insta_scraper::config::{load_settings, Settings};
use insta_scraper::media::{download_post_media, MediaFetcher, MediaOutcome};
use insta_scraper::output::{export_json, print_analytics, write_markdown_report, PostAnalytics};
use insta_scraper::{ResultsType, ScrapeRequest, Scraper, SearchType};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// insta-scraper: Instagram posts via the Apify actor API
///
/// Submits a scrape run for one or more Instagram profile URLs, waits for the
/// results, and prints engagement analytics. Results are exported as JSON
/// unless --no-export is given.
#[derive(Parser, Debug)]
#[command(name = "insta-scraper")]
#[command(version)]
#[command(about = "Scrape Instagram posts through Apify", long_about = None)]
struct Cli {
    /// Instagram profile URLs, e.g. https://www.instagram.com/natgeo/
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Maximum number of results per URL (1-1000)
    #[arg(long, default_value_t = 200)]
    results_limit: u32,

    /// Maximum number of search results (1-100)
    #[arg(long, default_value_t = 1)]
    search_limit: u32,

    /// What kind of search the URLs describe
    #[arg(long, value_enum, default_value_t = SearchType::User)]
    search_type: SearchType,

    /// What kind of results to return
    #[arg(long, value_enum, default_value_t = ResultsType::Posts)]
    results_type: ResultsType,

    /// Enhance user search with the linked Facebook page
    #[arg(long)]
    enhance_user_search_with_facebook_page: bool,

    /// Treat URLs as reel feeds
    #[arg(long)]
    is_user_reel_feed_url: bool,

    /// Treat URLs as tagged feeds
    #[arg(long)]
    is_user_tagged_feed_url: bool,

    /// Include parent profile data with each item
    #[arg(long)]
    add_parent_data: bool,

    /// Path to an optional TOML settings file
    #[arg(long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Directory for the JSON export (overrides the settings file)
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Skip the JSON export
    #[arg(long)]
    no_export: bool,

    /// Write a markdown report to this path
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Download post images into this directory
    #[arg(long, value_name = "DIR")]
    download_media: Option<PathBuf>,

    /// Validate input and show what would be submitted without scraping
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // URLs are validated before anything touches the network
    let request = build_request(&cli).context("Invalid scrape request")?;

    tracing::debug!(
        "Loading settings from: {}",
        cli.config
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<defaults>".to_string())
    );
    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;

    if cli.dry_run {
        return handle_dry_run(&request, &settings);
    }

    handle_scrape(&cli, &request, &settings).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("insta_scraper=info,warn")),
            1 => EnvFilter::new("insta_scraper=debug,info"),
            2 => EnvFilter::new("insta_scraper=trace,debug"),
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

fn build_request(cli: &Cli) -> insta_scraper::Result<ScrapeRequest> {
    let request = ScrapeRequest::builder(&cli.urls)
        .results_limit(cli.results_limit)
        .search_limit(cli.search_limit)
        .search_type(cli.search_type)
        .results_type(cli.results_type)
        .enhance_user_search_with_facebook_page(cli.enhance_user_search_with_facebook_page)
        .is_user_reel_feed_url(cli.is_user_reel_feed_url)
        .is_user_tagged_feed_url(cli.is_user_tagged_feed_url)
        .add_parent_data(cli.add_parent_data)
        .build()?;
    Ok(request)
}

/// Handles the --dry-run mode: shows what would be submitted
fn handle_dry_run(request: &ScrapeRequest, settings: &Settings) -> Result<()> {
    println!("=== insta-scraper Dry Run ===\n");

    println!("Apify:");
    println!("  Base URL: {}", settings.api.base_url);
    println!("  Actor: {}", settings.api.actor_id);
    println!("  API token: set");

    println!("\nPolling:");
    println!("  Interval: {}s", settings.polling.interval_secs);
    println!("  Timeout: {}s", settings.polling.timeout_secs);

    println!("\nURLs ({}):", request.direct_urls().len());
    for url in request.direct_urls() {
        println!("  - {}", url);
    }

    let input = ActorInput::from(request);
    println!("\nActor input:");
    println!("{}", serde_json::to_string_pretty(&input)?);

    println!("\n✓ Request is valid");
    Ok(())
}

/// Handles the main scrape operation
async fn handle_scrape(cli: &Cli, request: &ScrapeRequest, settings: &Settings) -> Result<()> {
    let scraper = Scraper::from_settings(settings)?;

    let posts = scraper
        .scrape_posts(request)
        .await
        .context("Scrape failed")?;

    if posts.is_empty() {
        tracing::warn!("No posts were returned");
    }

    let analytics = PostAnalytics::from_posts(&posts);
    print_analytics(&analytics);

    if !cli.no_export {
        let dir = cli
            .export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&settings.output.export_dir));
        let path = export_json(&posts, &dir, Utc::now()).context("JSON export failed")?;
        println!("✓ Exported {} posts to: {}", posts.len(), path.display());
    }

    let media = match &cli.download_media {
        Some(dir) => download_media(settings, &posts, dir).await?,
        None => Vec::new(),
    };

    if let Some(report_path) = &cli.report {
        write_markdown_report(&posts, &analytics, &media, report_path)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        println!("✓ Report written to: {}", report_path.display());
    }

    Ok(())
}

async fn download_media(
    settings: &Settings,
    posts: &[insta_scraper::Post],
    dir: &Path,
) -> Result<Vec<MediaOutcome>> {
    let fetcher = MediaFetcher::new(&settings.media).context("Failed to build media client")?;
    let outcomes = download_post_media(&fetcher, posts, dir)
        .await
        .with_context(|| format!("Failed to prepare media directory {}", dir.display()))?;

    let saved = outcomes.iter().filter(|o| o.is_saved()).count();
    println!("✓ Saved {}/{} media files to: {}", saved, outcomes.len(), dir.display());
    Ok(outcomes)
}
