//! # Pipeline Archiver
//!
//! Entry point for the `pipeline-archiver` binary. See [`pipeline_archiver::cli`]
//! for the available commands.

use clap::Parser;
use pipeline_archiver::cli::{self, Cli};
use pipeline_archiver::config::ArchiverConfig;
use pipeline_archiver::constants::EXIT_INVALID_INPUT;
use pipeline_archiver::observability;
use pipeline_archiver::runtime::{handle_command_error, initialization::initialize};
use std::process::ExitCode;
use tracing::warn;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = ArchiverConfig::from_env();
    cli.apply_to(&mut config);

    if let Err(e) = initialize(&config) {
        eprintln!("Failed to initialize pipeline-archiver: {e:#}");
        return ExitCode::from(EXIT_INVALID_INPUT);
    }

    let code = match cli::run(&cli, &config).await {
        Ok(()) => 0,
        Err(e) => handle_command_error(cli.command.name(), &e),
    };

    if let Some(path) = &config.metrics_file {
        if let Err(e) = observability::metrics::write_textfile(path) {
            warn!("Failed to write metrics file: {:#}", e);
        }
    }

    ExitCode::from(code)
}
