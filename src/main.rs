//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `geolocate_batch` library that handles:
//! - Command-line argument parsing and validation
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - User-facing output and exit codes
//!
//! All core functionality is implemented in the library crate.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::process;

use geolocate_batch::config::BatchOpt;
use geolocate_batch::initialization::init_logger_with;
use geolocate_batch::{run_batch, BatchConfig};

/// Exit code for invalid or missing arguments.
const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() {
    // GEOLOCATE_ENDPOINT may come from a .env file
    let _ = dotenvy::dotenv();

    let opt = BatchOpt::parse();
    let config = match BatchConfig::try_from(opt) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("geolocate_batch: {e}\n");
            let _ = BatchOpt::command().print_help();
            process::exit(EXIT_USAGE);
        }
    };

    if let Err(e) = init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")
    {
        eprintln!("geolocate_batch error: {:#}", e);
        process::exit(1);
    }

    match run_batch(&config).await {
        Ok(report) => {
            println!(
                "Geocoded {} record{} ({} skipped, {} without results, {} cached) in {:.1}s",
                report.records_processed,
                if report.records_processed == 1 { "" } else { "s" },
                report.records_skipped,
                report.zero_result_records,
                report.cache_hits,
                report.elapsed_seconds
            );
            println!(
                "{} rows written to {}",
                report.rows_written,
                report.output.display()
            );
        }
        Err(e) => {
            eprintln!("geolocate_batch error: {:#}", e);
            process::exit(1);
        }
    }
}
