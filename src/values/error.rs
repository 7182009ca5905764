//! # Aggregation Errors

use crate::source::FetchError;
use thiserror::Error;

/// A values aggregation that produced no result
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Rejected before any fetch; `field` names what is missing
    #[error("invalid values request: {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },
    #[error("failed to fetch values file {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },
    #[error("values file {path} is not valid YAML: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to render merged values: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

impl AggregateError {
    /// Path of the failing source, if a single source is to blame
    pub fn path(&self) -> Option<&str> {
        match self {
            AggregateError::Fetch { path, .. } | AggregateError::Parse { path, .. } => Some(path),
            AggregateError::InvalidInput { .. } | AggregateError::Serialize(_) => None,
        }
    }

    /// Metrics label
    pub fn reason(&self) -> &'static str {
        match self {
            AggregateError::InvalidInput { .. } => "invalid_input",
            AggregateError::Fetch { .. } => "fetch",
            AggregateError::Parse { .. } => "parse",
            AggregateError::Serialize(_) => "serialize",
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AggregateError::Fetch { source, .. } if source.is_transient())
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            AggregateError::InvalidInput { field, .. } => {
                format!("Provide '{field}' in the values request.")
            }
            AggregateError::Fetch { source, .. } => source.remediation(),
            AggregateError::Parse { .. } => {
                "Fix the YAML syntax of the values file in the repository.".to_string()
            }
            AggregateError::Serialize(_) => {
                "The merged document contains values that cannot be written as YAML.".to_string()
            }
        }
    }
}
