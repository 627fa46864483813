//! Review server entry point.
//!
//! Serves the map review page over a SQLite copy of a batch output and stores
//! approved points in a separate table.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::process;

use geolocate_batch::config::ReviewOpt;
use geolocate_batch::initialization::init_logger_with;
use geolocate_batch::{start_review_server, ReviewConfig};

const EXIT_USAGE: i32 = 2;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let opt = ReviewOpt::parse();
    let config = match ReviewConfig::try_from(opt) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("glc_review: {e}\n");
            let _ = ReviewOpt::command().print_help();
            process::exit(EXIT_USAGE);
        }
    };

    if let Err(e) = init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")
    {
        eprintln!("glc_review error: {:#}", e);
        process::exit(1);
    }

    if let Err(e) = start_review_server(&config).await {
        eprintln!("glc_review error: {:#}", e);
        process::exit(1);
    }
}
