//! Binary crate for the `weather-alert` command.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logging setup
//! - Wiring the AccuWeather provider and Twilio notifier into one check run
//!
//! Meant to be run from cron, once per scheduled check.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

mod cli;
mod logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cmd = cli::Cli::parse();
    logging::init(cmd.verbose);

    match cmd.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
