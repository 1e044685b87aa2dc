//! wrc-harvest main entry point
//!
//! Command-line trigger for one harvest run. The external scheduler invokes
//! it monthly, either with an explicit window or with none to harvest the
//! previous calendar month.

use anyhow::Context;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use wrc_harvest::config::{load_config_with_hash, Config, RunContext};
use wrc_harvest::crawler::Coordinator;
use wrc_harvest::output::{drain_to_writer, print_statistics};
use wrc_harvest::storage::SqliteContentStore;
use wrc_harvest::window::{previous_month, DateWindow};

/// wrc-harvest: harvest WRC decisions for a date window
///
/// Discovers every search result for the window, stores each decision's
/// source document in the content store and writes one JSON record per
/// stored document.
#[derive(Parser, Debug)]
#[command(name = "wrc-harvest")]
#[command(version)]
#[command(about = "Harvests Workplace Relations Commission decisions", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// First day of the window (DD-MM-YYYY); defaults to the previous month
    #[arg(long, value_name = "DD-MM-YYYY")]
    start_date: Option<String>,

    /// Last day of the window (DD-MM-YYYY); defaults to the previous month
    #[arg(long, value_name = "DD-MM-YYYY")]
    end_date: Option<String>,

    /// Write output records here instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the window and seed URLs without fetching anything
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
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let window = resolve_window(&cli)?;
    let ctx = RunContext::new(&config, window);

    if cli.dry_run {
        handle_dry_run(&ctx);
        return Ok(());
    }

    handle_harvest(&config, ctx, cli.output.as_ref()).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wrc_harvest=info,warn"),
            1 => EnvFilter::new("wrc_harvest=debug,info"),
            2 => EnvFilter::new("wrc_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout stays clean for output records
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Picks the run's window from the trigger parameters
///
/// No dates at all means "previous calendar month"; exactly one date is a
/// missing-parameter failure.
fn resolve_window(cli: &Cli) -> anyhow::Result<DateWindow> {
    if cli.start_date.is_none() && cli.end_date.is_none() {
        let window = previous_month(chrono::Utc::now().date_naive());
        tracing::info!("No window given, using previous month {}", window);
        return Ok(window);
    }

    let window = DateWindow::from_params(cli.start_date.as_deref(), cli.end_date.as_deref())?;
    Ok(window)
}

/// Handles --dry-run: shows what would be harvested
fn handle_dry_run(ctx: &RunContext) {
    println!("=== wrc-harvest Dry Run ===\n");
    println!("Window: {}", ctx.window);
    println!("Bucket: {}", ctx.bucket);
    println!(
        "Max concurrent requests: {}",
        ctx.crawler.max_concurrent_requests
    );
    println!("\nSeed URLs ({}):", ctx.bodies.len());
    for url in ctx.seed_urls() {
        println!("  * {}", url);
    }
}

/// Handles the main harvest
async fn handle_harvest(
    config: &Config,
    ctx: RunContext,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let store = SqliteContentStore::open(
        std::path::Path::new(&config.store.database_path),
        &config.store.principal,
    )
    .with_context(|| format!("opening content store {}", config.store.database_path))?;

    let writer: Box<dyn Write + Send> = match output {
        Some(path) => Box::new(std::io::BufWriter::new(
            std::fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout()),
    };

    let coordinator = Coordinator::new(ctx, Arc::new(store))?;
    let (tx, rx) = mpsc::channel(64);
    let writer_task = tokio::spawn(drain_to_writer(rx, writer));

    let stats = tokio::select! {
        result = coordinator.run(tx) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, abandoning in-flight fetches");
            anyhow::bail!("harvest interrupted");
        }
    };

    let written = writer_task.await.context("output writer task")??;
    tracing::info!("Wrote {} output records", written);

    if stats.failures() > 0 {
        tracing::warn!("{} items were skipped, see log for details", stats.failures());
    }
    if output.is_some() {
        print_statistics(&stats);
    }

    Ok(())
}
