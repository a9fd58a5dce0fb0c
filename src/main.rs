//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest content fetcher.

use clap::Parser;
use std::path::PathBuf;
use sumi_harvest::config::{load_config_with_hash, validate, Config};
use sumi_harvest::crawler::run_harvest;
use sumi_harvest::storage::CheckpointStore;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a bounded-concurrency content fetcher
///
/// Sumi-Harvest downloads a list of seed URLs with a bounded worker pool,
/// strips each page down to plain text, classifies it by keyword and
/// appends it to a per-URL output file. Interrupting a run with Ctrl-C
/// saves a checkpoint so the next run skips what was already fetched.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version)]
#[command(about = "A bounded-concurrency content fetcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start a fresh harvest, ignoring any saved checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with = "show_checkpoint")]
    dry_run: bool,

    /// Show the URLs recorded in the checkpoint and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_checkpoint: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            let cfg = Config::default();
            validate(&cfg)?;
            cfg
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.show_checkpoint {
        handle_show_checkpoint(&config);
    } else {
        handle_harvest(config, cli.fresh).await?;
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
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent workers: {}",
        config.crawler.max_concurrent_workers
    );
    println!("  Launch delay: {}ms", config.crawler.launch_delay_ms);
    println!("  Max visited URLs: {}", config.crawler.max_visited_urls);
    println!(
        "  Raw buffer: {} bytes (text buffer: {} bytes)",
        config.crawler.raw_buffer_capacity,
        config.crawler.text_buffer_capacity()
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Abort in-flight fetches: {}", config.crawler.abort_in_flight);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());
    println!("  Checkpoint: {}", config.output.checkpoint_path.display());

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --show-checkpoint mode: lists the saved visited URLs
fn handle_show_checkpoint(config: &Config) {
    let store = CheckpointStore::new(
        &config.output.checkpoint_path,
        config.crawler.max_visited_urls,
    );

    println!("Checkpoint: {}\n", store.path().display());
    match store.load() {
        Some(urls) => {
            println!("Visited URLs ({}):", urls.len());
            for url in &urls {
                let status = if config.seeds.contains(url) { "seed" } else { "other" };
                println!("  * {} [{}]", url, status);
            }
            let pending = config.seeds.iter().filter(|s| !urls.contains(s)).count();
            println!("\n{} of {} seeds still pending", pending, config.seeds.len());
        }
        None => println!("No checkpoint found"),
    }
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let cancel = CancellationToken::new();

    let interrupt = cancel.clone();
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("Failed to listen for Ctrl-C");
                return;
            }
            if interrupt.is_cancelled() {
                tracing::debug!("Already shutting down");
            } else {
                tracing::info!("Interrupt received, finishing in-flight workers");
                interrupt.cancel();
            }
        }
    });

    match run_harvest(&config, fresh, cancel).await {
        Ok(summary) => {
            if summary.cancelled {
                tracing::info!(
                    "Harvest interrupted after {} launches (checkpoint saved: {})",
                    summary.launched,
                    summary.checkpoint_saved
                );
            } else {
                tracing::info!("Harvest completed successfully");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
