//! # Archival Context
//!
//! What a finished pipeline step wants archived, and where.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Archival input for one pipeline step
///
/// Owned by the step invocation and read-only to the archiver.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivalContext {
    pub pipeline_name: String,
    #[serde(rename = "taskId", alias = "taskID")]
    pub task_id: u64,
    /// Opaque storage token (destination, optional subfolder, credentials).
    /// Empty means archival is disabled for this step.
    #[serde(default)]
    pub storage_uri: String,
    #[serde(default)]
    pub file_archive: Option<FileArchive>,
    #[serde(default)]
    pub test_archive: Option<TestArchive>,
}

impl fmt::Debug for ArchivalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchivalContext")
            .field("pipeline_name", &self.pipeline_name)
            .field("task_id", &self.task_id)
            .field("has_storage_uri", &!self.storage_uri.is_empty())
            .field("file_archive", &self.file_archive)
            .field("test_archive", &self.test_archive)
            .finish()
    }
}

impl ArchivalContext {
    pub fn new(pipeline_name: impl Into<String>, task_id: u64) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            task_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_storage_uri(mut self, storage_uri: impl Into<String>) -> Self {
        self.storage_uri = storage_uri.into();
        self
    }

    #[must_use]
    pub fn with_file_archive(mut self, file_archive: FileArchive) -> Self {
        self.file_archive = Some(file_archive);
        self
    }

    #[must_use]
    pub fn with_test_archive(mut self, test_archive: TestArchive) -> Self {
        self.test_archive = Some(test_archive);
        self
    }

    /// Whether any upload may happen at all
    pub fn has_destination(&self) -> bool {
        !self.storage_uri.trim().is_empty()
    }
}

/// Explicit file artifact, located relative to the workspace root
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileArchive {
    pub file_location: PathBuf,
    pub file_name: String,
}

impl FileArchive {
    pub fn new(file_location: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            file_location: file_location.into(),
            file_name: file_name.into(),
        }
    }
}

/// Test output produced by a step; may legitimately not exist
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestArchive {
    pub dir: PathBuf,
    pub file: String,
}

impl TestArchive {
    pub fn new(dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file: file.into(),
        }
    }
}
