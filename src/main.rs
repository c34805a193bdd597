//! docs-harvester main entry point
//!
//! This is the command-line interface for the docs-harvester crawler.

use anyhow::{Context, Result};
use clap::Parser;
use docs_harvester::config::{load_config, validate, ApiCredentials, Config, FilterMode};
use docs_harvester::crawler::crawl;
use docs_harvester::output::{prepare_output_dir, print_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// docs-harvester: a bounded-depth documentation crawler
///
/// docs-harvester walks a documentation site breadth-first from a base URL,
/// extracts the readable content of each page, optionally rewrites it through
/// a summarization service, and writes it into size-capped text files.
#[derive(Parser, Debug)]
#[command(name = "docs-harvester")]
#[command(version = "1.0.0")]
#[command(about = "A bounded-depth documentation crawler", long_about = None)]
struct Cli {
    /// Base URL of the documentation to crawl
    #[arg(long)]
    url: String,

    /// Directory for the output files
    #[arg(long = "output_dir", value_name = "DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Name used as the output file prefix
    #[arg(long = "company_name", value_name = "NAME")]
    company_name: String,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum link depth from the base URL
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Number of pages processed concurrently
    #[arg(long, value_name = "N")]
    workers: Option<u32>,

    /// Link filter mode
    #[arg(long, value_enum)]
    filter_mode: Option<FilterMode>,

    /// Persist extracted text without calling the summarizer
    #[arg(long)]
    raw: bool,

    /// Validate config and show what would be crawled without actually crawling
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
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&cli, &config);
        return Ok(());
    }

    handle_crawl(&cli, &config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docs_harvester=info,warn"),
            1 => EnvFilter::new("docs_harvester=debug,info"),
            2 => EnvFilter::new("docs_harvester=trace,debug"),
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

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(mode) = cli.filter_mode {
        config.filter.mode = mode;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(cli: &Cli, config: &Config) {
    println!("=== docs-harvester Dry Run ===\n");

    println!("Target:");
    println!("  Base URL: {}", cli.url);
    println!("  Output: {}", cli.output_dir.display());
    println!("  File prefix: {}", cli.company_name);

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Pacing: {}ms", config.crawler.pacing_ms);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nLink Filter:");
    println!("  Mode: {:?}", config.filter.mode);
    println!("  Required segments: {}", config.filter.required_segments.join(", "));
    println!("  Keywords: {}", config.filter.keywords.join(", "));
    println!("  Excluded topics: {}", config.filter.excluded_topics.join(", "));

    println!("\nOutput:");
    println!("  Max file size: {} bytes", config.output.max_file_size);

    println!("\nSummarizer:");
    if cli.raw {
        println!("  Disabled (--raw)");
    } else {
        println!("  Endpoint: {}", config.summarizer.endpoint);
        println!("  Attempts: {}", config.summarizer.max_attempts);
        println!("  Backoff: {:?}", config.summarizer.backoff);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: &Config) -> Result<()> {
    prepare_output_dir(&cli.output_dir).context("output directory check failed")?;

    let credentials = if cli.raw {
        tracing::info!("Raw mode: summarizer disabled");
        None
    } else {
        Some(ApiCredentials::from_env().context("summarizer credentials are not set")?)
    };

    tracing::info!(
        "Crawling {} into {} as '{}'",
        cli.url,
        cli.output_dir.display(),
        cli.company_name
    );

    let report = crawl(
        &cli.url,
        &cli.output_dir,
        &cli.company_name,
        config,
        credentials.as_ref(),
    )
    .await
    .with_context(|| format!("crawl of {} failed", cli.url))?;

    print_report(&report);
    Ok(())
}
