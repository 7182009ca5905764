//! # Archiver
//!
//! Uploads the artifact a pipeline step declared, under
//! `[base/]pipeline/task/{file|test}/name`.

use super::error::ArchiveError;
use super::mode::ArchiveMode;
use crate::model::{ArchivalContext, FileArchive, TestArchive};
use crate::observability::metrics;
use crate::storage::StoreFactory;
use paths::KindTag;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, field, info, info_span, Instrument};

/// Result of a successful archive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The artifact was uploaded under `key`
    Uploaded { key: String, local_path: PathBuf },
    /// Test output was expected but never produced
    Skipped { local_path: PathBuf },
    /// No destination or nothing declared
    NoOp,
}

impl ArchiveOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveOutcome::Uploaded { .. } => "uploaded",
            ArchiveOutcome::Skipped { .. } => "skipped",
            ArchiveOutcome::NoOp => "noop",
        }
    }
}

/// Archives step artifacts through stores built by `F`
///
/// Holds no per-call state; a fresh store is built from the context's
/// storage token on every call.
#[derive(Debug, Clone)]
pub struct Archiver<F> {
    workspace_root: PathBuf,
    factory: F,
}

impl<F: StoreFactory> Archiver<F> {
    pub fn new(workspace_root: impl Into<PathBuf>, factory: F) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            factory,
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Archive whatever `ctx` declares
    ///
    /// Missing destination, missing descriptors and absent test output are all
    /// successes. Store construction and upload failures are returned as-is
    /// and never retried here.
    pub async fn archive(&self, ctx: &ArchivalContext) -> Result<ArchiveOutcome, ArchiveError> {
        let mode = ArchiveMode::select(ctx);
        let span = info_span!(
            "archive.run",
            pipeline.name = %ctx.pipeline_name,
            task.id = ctx.task_id,
            archive.mode = mode.as_str(),
            archive.outcome = field::Empty,
            operation.duration_ms = field::Empty,
            operation.success = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();
        metrics::increment_archive_runs(mode.as_str());

        let result = async {
            match (mode, mode.kind_tag()) {
                (ArchiveMode::FileArtifact(file), Some(kind)) => {
                    self.archive_file(ctx, file, kind).await
                }
                (ArchiveMode::TestArtifact(test), Some(kind)) => {
                    self.archive_test(ctx, test, kind).await
                }
                _ => {
                    debug!("Nothing to archive for {}/{}", ctx.pipeline_name, ctx.task_id);
                    metrics::increment_skips(if ctx.has_destination() {
                        "no_descriptor"
                    } else {
                        "no_destination"
                    });
                    Ok(ArchiveOutcome::NoOp)
                }
            }
        }
        .instrument(span)
        .await;

        span_clone.record("operation.duration_ms", start.elapsed().as_millis() as u64);
        match &result {
            Ok(outcome) => {
                span_clone.record("operation.success", true);
                span_clone.record("archive.outcome", outcome.as_str());
            }
            Err(e) => {
                span_clone.record("operation.success", false);
                metrics::increment_upload_errors(e.stage());
                error!(
                    "Archive failed for {}: {} ({})",
                    e.local_path().display(),
                    e,
                    e.remediation()
                );
            }
        }
        result
    }

    async fn archive_file(
        &self,
        ctx: &ArchivalContext,
        file: &FileArchive,
        kind: KindTag,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        let location = join_under(&self.workspace_root, &file.file_location);
        let local_path = join_under(&location, Path::new(&file.file_name));
        self.upload(ctx, kind, local_path, &file.file_name).await
    }

    async fn archive_test(
        &self,
        ctx: &ArchivalContext,
        test: &TestArchive,
        kind: KindTag,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        let local_path = join_under(&test.dir, Path::new(&test.file));

        // Checked before the store is built so an absent output never surfaces
        // a storage error. Stat failures other than not-found fall through to
        // the upload, which reports them.
        if let Ok(false) = tokio::fs::try_exists(&local_path).await {
            info!(
                "Test output {} not found, skipping archive",
                local_path.display()
            );
            metrics::increment_skips("missing_test_output");
            return Ok(ArchiveOutcome::Skipped { local_path });
        }

        self.upload(ctx, kind, local_path, &test.file).await
    }

    async fn upload(
        &self,
        ctx: &ArchivalContext,
        kind: KindTag,
        local_path: PathBuf,
        object_name: &str,
    ) -> Result<ArchiveOutcome, ArchiveError> {
        let mut store = match self.factory.from_encrypted_uri(&ctx.storage_uri) {
            Ok(store) => store,
            Err(source) => return Err(ArchiveError::Store { local_path, source }),
        };

        let subfolder =
            paths::compose_subfolder(store.subfolder(), &ctx.pipeline_name, ctx.task_id, kind);
        debug!("Archiving {} under {}", local_path.display(), subfolder);
        store.set_subfolder(subfolder);

        let start = Instant::now();
        match store.upload(&local_path, object_name).await {
            Ok(key) => {
                metrics::observe_upload_duration(start.elapsed().as_secs_f64());
                metrics::increment_uploads();
                info!("Archived {} to {}", local_path.display(), key);
                Ok(ArchiveOutcome::Uploaded { key, local_path })
            }
            Err(source) => Err(ArchiveError::Upload { local_path, source }),
        }
    }
}

/// Append `part` below `base`
///
/// Root and prefix components of `part` are dropped, so an absolute
/// descriptor path still resolves inside `base`.
fn join_under(base: &Path, part: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    joined.extend(
        part.components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_))),
    );
    joined
}
