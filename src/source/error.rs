//! # Fetch Errors

use thiserror::Error;

/// A single source could not be fetched
///
/// Every variant names the source path so the operator can correct it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("codehost {codehost_id} is not configured (path {path})")]
    UnknownCodehost { codehost_id: u64, path: String },
    #[error("no codehost id or repository link given for {path}")]
    NoDestination { path: String },
    #[error("cannot build request URL for {path}: {reason}")]
    InvalidUrl { path: String, reason: String },
    #[error("request for {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetching {path} returned HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("partial download of {path}: expected {expected} bytes, received {received}")]
    Partial {
        path: String,
        expected: u64,
        received: u64,
    },
}

impl FetchError {
    /// Path of the source that failed
    pub fn path(&self) -> &str {
        match self {
            FetchError::UnknownCodehost { path, .. }
            | FetchError::NoDestination { path }
            | FetchError::InvalidUrl { path, .. }
            | FetchError::Request { path, .. }
            | FetchError::Status { path, .. }
            | FetchError::Partial { path, .. } => path,
        }
    }

    /// Network failures, throttling, server errors and truncated bodies
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Request { source, .. } => !source.is_builder() && !source.is_redirect(),
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::Partial { .. } => true,
            FetchError::UnknownCodehost { .. }
            | FetchError::NoDestination { .. }
            | FetchError::InvalidUrl { .. } => false,
        }
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            FetchError::UnknownCodehost { codehost_id, .. } => format!(
                "Add codehost {codehost_id} to the codehost config file or use a repository link."
            ),
            FetchError::NoDestination { .. } => {
                "Set a codehost id with owner, repo and branch, or a repository link.".to_string()
            }
            FetchError::InvalidUrl { .. } => {
                "Check the codehost address and the repository link are absolute http(s) URLs.".to_string()
            }
            FetchError::Status { status: 401 | 403, .. } => {
                "The codehost rejected the access token. Check it can read the repository.".to_string()
            }
            FetchError::Status { status: 404, .. } => {
                "The file does not exist at that ref. Check the owner, repo, branch and path.".to_string()
            }
            _ if self.is_transient() => {
                "The codehost is unreachable or overloaded. Re-run the request later.".to_string()
            }
            _ => "The codehost refused the request. Check the error message for details.".to_string(),
        }
    }
}
