//! # Data Sweeper command line
//!
//! ```bash
//! datasweeper preview sales.csv --rows 10
//! datasweeper convert sales.csv report.xlsx --dedup --fill-missing --to excel
//! ```
//!
//! Settings are read from `<config dir>/datasweeper/config.json`; flags win
//! over settings. The exit status is non-zero when any file failed.

#![warn(clippy::all, rust_2018_idioms)]
#![expect(clippy::print_stdout)] // Allow println! in main binary

mod cli;

use clap::Parser as _;
use datasweeper::config::SweeperConfig;
use datasweeper::logging::{self, LoggingOptions};
use std::process::ExitCode;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = cli::Cli::parse();

    let (config, config_error) = match SweeperConfig::load() {
        Ok(config) => (config, None),
        Err(err) => (SweeperConfig::default(), Some(err)),
    };

    logging::init(&LoggingOptions {
        default_filter: None,
        log_to_file: cli.log_file || config.log_to_file,
    })?;
    if let Some(err) = config_error {
        tracing::warn!("Using default settings: {err:#}");
    }

    if cli::run_command(cli.command, &config)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
