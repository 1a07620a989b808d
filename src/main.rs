//! Edgar-Harvest main entry point
//!
//! This is the command-line interface for the Edgar-Harvest filing search harvester.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use edgar_harvest::config::{read_config, validate, Config, FetcherKind};
use edgar_harvest::fetcher::Fetcher;
use edgar_harvest::harvest::{harvest, Partitioner};
use edgar_harvest::output::print_report;
use edgar_harvest::query::{FilingCategory, Query, SearchEndpoint};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Edgar-Harvest: complete enumeration of capped filing searches
///
/// The search interface reports at most 10,000 matches per query. Edgar-Harvest
/// splits the date range until every piece fits under that cap, then pages
/// through each piece and appends every filing row to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "edgar-harvest")]
#[command(version)]
#[command(about = "Harvests every match of a full-text filing search", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Document words or phrases to search for
    #[arg(value_name = "KEYWORDS")]
    keywords: Vec<String>,

    /// Company name, ticker, or CIK
    #[arg(short, long)]
    entity: Option<String>,

    /// Filing category, e.g. `proxy_materials`
    #[arg(short, long)]
    category: Option<FilingCategory>,

    /// Match the keywords as one exact phrase
    #[arg(long)]
    exact: bool,

    /// First filing date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    start: Option<NaiveDate>,

    /// Last filing date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    end: Option<NaiveDate>,

    /// Per-attempt fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    wait_secs: Option<u64>,

    /// Fetch attempts per page
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// Page fetcher: `browser` or `http`
    #[arg(long, value_name = "KIND")]
    fetcher: Option<FetcherKind>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    show_browser: bool,

    /// CSV file to append records to
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the first query URL without fetching anything
    #[arg(long, conflicts_with = "plan")]
    dry_run: bool,

    /// Partition the date range and list the queries without harvesting them
    #[arg(long, conflicts_with = "dry_run")]
    plan: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            read_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => Config::default(),
    };
    apply_overrides(&mut config, &cli);

    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.plan {
        handle_plan(&config).await?;
    } else {
        handle_harvest(&config).await?;
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
            0 => EnvFilter::new("edgar_harvest=info,warn"),
            1 => EnvFilter::new("edgar_harvest=debug,info"),
            2 => EnvFilter::new("edgar_harvest=trace,debug"),
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

/// Command-line values take precedence over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if !cli.keywords.is_empty() {
        config.search.keywords = cli.keywords.clone();
    }
    if let Some(entity) = &cli.entity {
        config.search.entity = Some(entity.clone());
    }
    if let Some(category) = cli.category {
        config.search.category = Some(category);
    }
    if cli.exact {
        config.search.exact = true;
    }
    if let Some(start) = cli.start {
        config.search.start_date = Some(start);
    }
    if let Some(end) = cli.end {
        config.search.end_date = Some(end);
    }
    if let Some(secs) = cli.wait_secs {
        config.fetch.wait_for_request_secs = secs;
    }
    if let Some(retries) = cli.retries {
        config.fetch.stop_after_n = retries;
    }
    if let Some(fetcher) = cli.fetcher {
        config.fetch.fetcher = fetcher;
    }
    if cli.show_browser {
        config.fetch.headless = false;
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.clone();
    }
}

/// Handles the --dry-run mode: validates config and shows the root query
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let interval = config.interval()?;
    let criteria = config.criteria();

    println!("=== Edgar-Harvest Dry Run ===\n");

    println!("Search:");
    match criteria.phrase() {
        Some(phrase) => println!("  Keywords: {}", phrase),
        None => println!("  Keywords: (none)"),
    }
    println!("  Entity: {}", criteria.entity().unwrap_or("(any)"));
    match criteria.category {
        Some(category) => println!("  Category: {} ({})", category, category.code()),
        None => println!("  Category: (any)"),
    }
    println!("  Date range: {} ({} days)", interval, interval.num_days());

    println!("\nFetching:");
    println!("  Fetcher: {}", config.fetch.fetcher);
    println!("  Base URL: {}", config.fetch.base_url);
    println!("  Timeout: {}s", config.fetch.wait_for_request_secs);
    println!("  Attempts: {}", config.fetch.stop_after_n);
    println!("  Batches: {}", config.partition.batches);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    let root = Query::new(Arc::new(criteria), interval);
    println!("\n✓ Configuration is valid");
    println!("✓ First request: {}", config.endpoint().url_for(&root, 1));

    Ok(())
}

/// Handles the --plan mode: partitions the range and lists the queries
async fn handle_plan(config: &Config) -> anyhow::Result<()> {
    let interval = config.interval()?;
    let fetcher = Fetcher::connect(config).await?;
    let endpoint = config.endpoint();

    let root = Query::new(Arc::new(config.criteria()), interval);
    let plan = Partitioner::new(&fetcher, &endpoint)
        .with_batches(config.partition.batches)
        .partition(root)
        .await;
    fetcher.close().await;
    let plan = plan?;

    println!("=== Harvest Plan ===\n");
    println!("Queries ({}):", plan.queries.len());
    for query in &plan.queries {
        println!("{}", plan_line(&endpoint, query));
    }

    if !plan.gaps.is_empty() {
        println!("\nCoverage Gaps ({}):", plan.gaps.len());
        for gap in &plan.gaps {
            println!("  - {}", gap);
        }
    }

    Ok(())
}

/// One finalized query with the URL of its first page
fn plan_line(endpoint: &SearchEndpoint, query: &Query) -> String {
    format!("  - {}  {}", query.interval(), endpoint.url_for(query, 1))
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Writing records to {}", config.output.csv_path);

    match harvest(config).await {
        Ok(report) => {
            print_report(&report);
            if !report.is_complete() {
                tracing::warn!("Harvest finished with gaps; see the report above");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
