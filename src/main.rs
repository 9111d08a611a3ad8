//! Seine main entry point
//!
//! Command-line interface for inspecting and priming a frontier database.
//! The frontier itself is a library; this binary validates configuration,
//! seeds a frontier database, and reports on its queues.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use seine::config::load_config;
use seine::frontier::Frontier;
use seine::storage::open_store;

/// Seine: a polite per-host crawl frontier
#[derive(Parser, Debug)]
#[command(name = "seine")]
#[command(version = "0.2.0")]
#[command(about = "A polite per-host crawl frontier", long_about = None)]
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

    /// Validate config and show what would be scheduled without touching
    /// the database
    #[arg(long, conflicts_with = "report")]
    dry_run: bool,

    /// Report on the frontier database without scheduling seeds
    #[arg(long, conflicts_with = "dry_run")]
    report: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.report {
        handle_report(config)
    } else {
        handle_seed(config)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seine=info,warn"),
            1 => EnvFilter::new("seine=debug,info"),
            2 => EnvFilter::new("seine=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be
/// scheduled
fn handle_dry_run(config: &seine::config::Config) {
    println!("=== Seine Dry Run ===\n");

    println!("Politeness:");
    println!("  Delay factor: {}", config.politeness.delay_factor);
    println!(
        "  Delay bounds: {}ms - {}ms",
        config.politeness.min_delay_ms, config.politeness.max_delay_ms
    );
    println!("  Max retries: {}", config.politeness.max_retries);
    println!(
        "  Retry delay: {}s",
        config.politeness.retry_delay_seconds
    );
    println!("  Host valence: {}", config.politeness.host_valence);
    println!(
        "  Preference embed hops: {}",
        config.politeness.preference_embed_hops
    );

    println!("\nFrontier:");
    println!(
        "  Mode: {}",
        if config.frontier.one_shot {
            "one-shot"
        } else {
            "adaptive revisit"
        }
    );

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        match seine::class_key_for(seed) {
            Some(key) => println!("  - {} (host queue: {})", seed, key),
            None => println!("  - {} (UNSCHEDULABLE)", seed),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --report mode: prints queue states from the database
fn handle_report(config: seine::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(Path::new(&config.storage.database_path))?;
    let frontier = Frontier::new(config, store)?;
    print!("{}", frontier.report());
    Ok(())
}

/// Default mode: schedules the configured seeds into the frontier
/// database and reports on the result
fn handle_seed(config: seine::config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(Path::new(&config.storage.database_path))?;
    let frontier = Frontier::new(config, store)?;

    let admitted = frontier.load_seeds();
    tracing::info!("Scheduled {} new seed(s)", admitted);

    print!("{}", frontier.report());
    Ok(())
}
