//! # news_window
//!
//! Command-line entry point. Parses flags, loads the optional config file,
//! opens the run's log file and hands over to [`news_window::run`].
//!
//! ## Usage
//!
//! ```sh
//! news_window -p wildfire -t California --start-date 01/05/2024 --end-date 02/01/2024
//! ```
//!
//! Exits with status 0 when the run succeeds and 1 otherwise.

use chrono::Local;
use clap::Parser;
use news_window::cli::Cli;
use news_window::{logging, run, ScraperConfig};
use std::process::ExitCode;
use tracing::{debug, error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let mut config = match ScraperConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("news_window: {e}");
            return ExitCode::FAILURE;
        }
    };
    args.apply_overrides(&mut config);

    let log = match logging::init(&config.log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("news_window: cannot open log file in {}: {e}", config.log_dir.display());
            return ExitCode::FAILURE;
        }
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %log.path().display(),
        "news_window starting up"
    );
    debug!(?args, ?config, "Parsed arguments");

    let Some(request) = args.run_request(Local::now().date_naive()) else {
        error!(months = ?args.months, "Month span is out of range");
        return ExitCode::FAILURE;
    };

    if run(&request, &config).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
