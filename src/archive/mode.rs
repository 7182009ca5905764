//! # Archive Mode
//!
//! Which archival path a call takes, selected once per call.

use crate::model::{ArchivalContext, FileArchive, TestArchive};
use paths::KindTag;

/// Archival path for one call
///
/// A file artifact takes precedence over test output. Without a storage
/// destination nothing is archived regardless of the descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveMode<'a> {
    FileArtifact(&'a FileArchive),
    TestArtifact(&'a TestArchive),
    None,
}

impl<'a> ArchiveMode<'a> {
    pub fn select(ctx: &'a ArchivalContext) -> Self {
        if !ctx.has_destination() {
            return ArchiveMode::None;
        }
        match (&ctx.file_archive, &ctx.test_archive) {
            (Some(file), _) => ArchiveMode::FileArtifact(file),
            (None, Some(test)) => ArchiveMode::TestArtifact(test),
            (None, None) => ArchiveMode::None,
        }
    }

    /// Kind segment used in the object key, if anything is uploaded
    pub fn kind_tag(&self) -> Option<KindTag> {
        match self {
            ArchiveMode::FileArtifact(_) => Some(KindTag::File),
            ArchiveMode::TestArtifact(test) => Some(KindTag::for_test_archive(&test.file)),
            ArchiveMode::None => None,
        }
    }

    /// Label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveMode::FileArtifact(_) => "file",
            ArchiveMode::TestArtifact(_) => "test",
            ArchiveMode::None => "none",
        }
    }
}
