//! relabel - sort photos into capture-date order
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use relabel::config::{CliArgs, SortConfig};
use relabel::progress::{print_header, print_summary, ProgressReporter};
use relabel::walker::SortCoordinator;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = SortConfig::from_args(args).context("Invalid configuration")?;

    // Not a directory: say so and stop without doing anything
    if !config.source_is_dir() {
        println!("Path: {} is not a valid directory.", config.source.display());
        return Ok(());
    }

    let destination = config.destination.display().to_string();
    let show_progress = config.show_progress;

    if show_progress {
        print_header(
            &config.source.display().to_string(),
            config.worker_count,
            &destination,
            config.dry_run,
        );
    }

    let mut coordinator = SortCoordinator::new(config);
    if show_progress {
        let progress = ProgressReporter::new();
        progress.set_status("Looking for leaf directories...");
        coordinator = coordinator.with_progress(progress);
    }

    let summary = coordinator.run().context("Sort failed")?;

    println!("Execution took: {} [s].", summary.duration.as_secs_f64());

    if show_progress {
        print_summary(&summary, &destination);
    }

    if summary.error_count() > 0 {
        info!(errors = summary.error_count(), "Sort completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "relabel=debug,warn"
    } else {
        "relabel=info,warn"
    };

    // RUST_LOG wins over the verbosity flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(())
}
