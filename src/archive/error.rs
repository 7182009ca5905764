//! # Archive Errors

use crate::storage::{StoreError, UploadError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A hard archival failure
///
/// Both variants carry the local path that was being archived so operators
/// can tell which artifact was affected.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot open storage to archive {}: {source}", .local_path.display())]
    Store {
        local_path: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("failed to archive {}: {source}", .local_path.display())]
    Upload {
        local_path: PathBuf,
        #[source]
        source: UploadError,
    },
}

impl ArchiveError {
    pub fn local_path(&self) -> &Path {
        match self {
            ArchiveError::Store { local_path, .. } | ArchiveError::Upload { local_path, .. } => {
                local_path
            }
        }
    }

    /// Metrics label for the failing stage
    pub fn stage(&self) -> &'static str {
        match self {
            ArchiveError::Store { .. } => "store",
            ArchiveError::Upload { .. } => "upload",
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            ArchiveError::Store { source, .. } => source.is_transient(),
            ArchiveError::Upload { source, .. } => source.is_transient(),
        }
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            ArchiveError::Store { source, .. } => source.remediation(),
            ArchiveError::Upload { source, .. } => source.remediation(),
        }
    }
}
