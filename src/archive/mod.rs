//! # Artifact Archival
//!
//! Decides what a finished pipeline step archives, derives the object key and
//! uploads through a [`crate::storage::RemoteStore`].
//!
//! - `FileArtifact`: `workspace/fileLocation/fileName` under kind `file`
//! - `TestArtifact`: `dir/file` under kind `file` for `.tar.gz` bundles and
//!   `test` otherwise; skipped when the file was never produced
//! - `None`: no storage destination or nothing declared

mod archiver;
mod error;
mod mode;

pub use archiver::{ArchiveOutcome, Archiver};
pub use error::ArchiveError;
pub use mode::ArchiveMode;
