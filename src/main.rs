//! pj-portal-crawler main entry point
//!
//! This is the command-line interface: load configuration, crawl the
//! directory, filter by keyword and export the tables.

use anyhow::{bail, Context};
use clap::Parser;
use pj_portal_crawler::aggregate::aggregate;
use pj_portal_crawler::config::{load_config, load_config_from_env, Config, FailurePolicy};
use pj_portal_crawler::crawler::crawl;
use pj_portal_crawler::output::{export_all, CsvSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// pj-portal-crawler: contact harvester for the PJ directory
///
/// Crawls every university and teaching hospital listed on the directory,
/// then writes, per keyword, the university contacts, hospital contacts and
/// hospital homepages of hospitals offering that specialty.
#[derive(Parser, Debug)]
#[command(name = "pj-portal-crawler")]
#[command(version)]
#[command(about = "Contact harvester for the PJ directory", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (environment variables are used if omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Env file to read URL and KEYWORDS from (default: pj.env if present)
    #[arg(long, value_name = "PATH", conflicts_with = "config")]
    env_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Skip failing university and hospital pages instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
        }
        None => {
            tracing::info!("Loading configuration from environment");
            load_config_from_env(cli.env_file.as_deref())
        }
    }
    .context("Failed to load configuration")?;

    if cli.keep_going {
        config.output.on_error = FailurePolicy::Skip;
    }

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    run(&config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pj_portal_crawler=info,warn"),
            1 => EnvFilter::new("pj_portal_crawler=debug,info"),
            2 => EnvFilter::new("pj_portal_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== pj-portal-crawler Dry Run ===\n");

    println!("Site:");
    println!("  Home page: {}", config.site.url);
    println!("  Link base: {}", config.site.resolved_base_url());

    println!("\nKeywords ({}):", config.search.keywords.len());
    for keyword in &config.search.keywords {
        println!("  - {}", keyword);
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());
    println!("  On error: {:?}", config.output.on_error);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would write {} tables",
        config.search.keywords.len() * 3
    );
}

/// Crawls, filters and exports
async fn run(config: &Config) -> anyhow::Result<()> {
    let started = std::time::Instant::now();
    tracing::info!("Starting crawl at {}", config.site.url);

    let outcome = match crawl(config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Crawl completed: {} universities, {} hospitals, {} pages in {:.1}s",
        outcome.universities.len(),
        outcome.hospital_count(),
        outcome.pages_fetched,
        started.elapsed().as_secs_f64()
    );
    for failure in &outcome.failures {
        tracing::warn!(
            "Skipped {} page {}: {}",
            failure.kind,
            failure.url,
            failure.message
        );
    }

    let tables = aggregate(&outcome.universities, &config.search.keywords);
    for keyword_tables in &tables {
        tracing::info!(
            "Keyword {}: {} matching hospitals",
            keyword_tables.keyword,
            keyword_tables.matched_hospitals()
        );
    }

    let sink = CsvSink::new(&config.output.directory);
    let report = export_all(&sink, &tables);
    if !report.is_success() {
        let failed: Vec<&str> = report.failed.iter().map(|(k, _)| k.as_str()).collect();
        bail!("Export failed for keywords: {}", failed.join(", "));
    }

    tracing::info!(
        "Exported {} keywords to {}",
        report.exported.len(),
        sink.directory().display()
    );
    Ok(())
}
