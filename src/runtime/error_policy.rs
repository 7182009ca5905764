//! # Error Policy
//!
//! Maps command failures to process exit codes and logs remediation.
//!
//! | Exit code | Meaning |
//! |-----------|---------|
//! | 0 | success, skip or no-op |
//! | 1 | permanent failure |
//! | 2 | invalid input or configuration |
//! | 3 | transient failure, the pipeline may re-run the step |

use crate::archive::ArchiveError;
use crate::config::ConfigError;
use crate::constants::{EXIT_INVALID_INPUT, EXIT_PERMANENT_FAILURE, EXIT_TRANSIENT_FAILURE};
use crate::values::AggregateError;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of a CLI command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// How a failure should be reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    InvalidInput,
    Transient,
    Permanent,
}

impl FailureClass {
    pub fn exit_code(self) -> u8 {
        match self {
            FailureClass::InvalidInput => EXIT_INVALID_INPUT,
            FailureClass::Transient => EXIT_TRANSIENT_FAILURE,
            FailureClass::Permanent => EXIT_PERMANENT_FAILURE,
        }
    }
}

impl CommandError {
    pub fn failure_class(&self) -> FailureClass {
        match self {
            CommandError::Config(e) if e.is_transient() => FailureClass::Transient,
            CommandError::Config(_) => FailureClass::InvalidInput,
            // An undecodable storage token is a pipeline configuration problem
            CommandError::Archive(ArchiveError::Store { .. }) => FailureClass::InvalidInput,
            CommandError::Archive(e) if e.is_transient() => FailureClass::Transient,
            CommandError::Archive(_) => FailureClass::Permanent,
            CommandError::Aggregate(AggregateError::InvalidInput { .. }) => {
                FailureClass::InvalidInput
            }
            CommandError::Aggregate(e) if e.is_transient() => FailureClass::Transient,
            CommandError::Aggregate(_) | CommandError::Other(_) => FailureClass::Permanent,
        }
    }

    pub fn remediation(&self) -> Option<String> {
        match self {
            CommandError::Config(e) => Some(e.remediation()),
            CommandError::Archive(e) => Some(e.remediation()),
            CommandError::Aggregate(e) => Some(e.remediation()),
            CommandError::Other(_) => None,
        }
    }
}

/// Log a command failure and return the exit code for it
pub fn handle_command_error(command: &str, err: &CommandError) -> u8 {
    let class = err.failure_class();
    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "command.error",
        command = command,
        error.class = ?class,
        error = %err
    );
    let _error_guard = error_span.enter();

    error!("❌ {} failed: {:#}", command, err);
    if let Some(remediation) = err.remediation() {
        warn!("Remediation: {}", remediation);
    }
    if class == FailureClass::Transient {
        warn!("The failure looks transient; re-running the step may succeed");
    }
    class.exit_code()
}
