//! Article scraper CLI
//!
//! `fetch` renders an article in headless Chromium and saves it as JSON, text
//! and HTML. `stats` summarizes a previously saved JSON record. Results are
//! printed to stdout as JSON; logs go to stderr.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use kodegen_tools_articlescrape::{
    ArticleScraper, ArticleStatistics, ScrapeConfig, ScrapeReport, ScrapeRequest,
    load_record_json, utils::is_valid_url,
};

#[derive(Parser)]
#[command(author, version, about = "Render, extract and archive articles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve an article and save it locally
    Fetch(FetchArgs),

    /// Print statistics and keywords for a saved JSON record
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Article URL
    #[arg(required = true)]
    url: String,

    /// Skip image downloads; every image becomes a placeholder
    #[arg(long)]
    no_images: bool,

    /// Base name for the saved files instead of one derived from the title
    #[arg(short, long)]
    name: Option<String>,

    /// Root directory for saved articles
    #[arg(short, long, default_value = "articles")]
    output_dir: PathBuf,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Retrieval attempts before giving up
    #[arg(long, default_value = "3")]
    max_attempts: u32,

    /// Overall retrieval deadline in seconds
    #[arg(long)]
    deadline_secs: Option<u64>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// JSON record written by `fetch`
    #[arg(required = true)]
    json_file: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C, shutting down");
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

async fn fetch(args: FetchArgs) -> Result<bool> {
    if !is_valid_url(&args.url) {
        bail!("Not an http(s) URL: {}", args.url);
    }

    let config = ScrapeConfig::builder()
        .output_dir(&args.output_dir)
        .headless(!args.headed)
        .download_images(!args.no_images)
        .max_attempts(args.max_attempts)
        .build()?;

    let mut request = ScrapeRequest::new(&args.url);
    if let Some(name) = args.name {
        request = request.custom_base_name(name);
    }
    if let Some(secs) = args.deadline_secs {
        request = request.deadline(Duration::from_secs(secs));
    }

    let scraper = ArticleScraper::new(&config);

    let report = tokio::select! {
        result = scraper.scrape(&request) => Some(ScrapeReport::from(&result)),
        () = shutdown_signal() => None,
    };

    scraper.shutdown().await;

    match report {
        Some(report) => {
            print_json(&report)?;
            Ok(report.is_success())
        }
        None => bail!("Interrupted before the article was saved"),
    }
}

async fn stats(args: StatsArgs) -> Result<()> {
    let record = load_record_json(&args.json_file)
        .await
        .with_context(|| format!("Failed to load {}", args.json_file.display()))?;
    print_json(&ArticleStatistics::from_record(&record))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch(args) => {
            if !fetch(args).await? {
                std::process::exit(1);
            }
        }
        Commands::Stats(args) => stats(args).await?,
    }

    Ok(())
}
