//! # Archive Metrics
//!
//! Metrics for archive runs: selected mode, uploads, upload failures and skips.

use super::registry::register_collector;
use prometheus::{Histogram, IntCounter, IntCounterVec};
use std::sync::LazyLock;

static ARCHIVE_RUNS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "pipeline_archiver_archive_runs_total",
            "Total number of archive calls by selected mode",
        ),
        &["mode"],
    )
    .expect("Failed to create ARCHIVE_RUNS_TOTAL metric - this should never happen")
});

static UPLOADS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pipeline_archiver_uploads_total",
        "Total number of successful artifact uploads",
    )
    .expect("Failed to create UPLOADS_TOTAL metric - this should never happen")
});

static UPLOAD_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "pipeline_archiver_upload_errors_total",
            "Total number of archive failures by stage (store, upload)",
        ),
        &["stage"],
    )
    .expect("Failed to create UPLOAD_ERRORS_TOTAL metric - this should never happen")
});

static SKIPS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "pipeline_archiver_skips_total",
            "Total number of archive calls that uploaded nothing, by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create SKIPS_TOTAL metric - this should never happen")
});

static UPLOAD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "pipeline_archiver_upload_duration_seconds",
            "Duration of artifact uploads in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("Failed to create UPLOAD_DURATION metric - this should never happen")
});

/// Register archive metrics with the registry
pub(crate) fn register_archive_metrics() -> prometheus::Result<()> {
    register_collector(&*ARCHIVE_RUNS_TOTAL)?;
    register_collector(&*UPLOADS_TOTAL)?;
    register_collector(&*UPLOAD_ERRORS_TOTAL)?;
    register_collector(&*SKIPS_TOTAL)?;
    register_collector(&*UPLOAD_DURATION)?;
    Ok(())
}

pub fn increment_archive_runs(mode: &str) {
    ARCHIVE_RUNS_TOTAL.with_label_values(&[mode]).inc();
}

pub fn increment_uploads() {
    UPLOADS_TOTAL.inc();
}

pub fn increment_upload_errors(stage: &str) {
    UPLOAD_ERRORS_TOTAL.with_label_values(&[stage]).inc();
}

pub fn increment_skips(reason: &str) {
    SKIPS_TOTAL.with_label_values(&[reason]).inc();
}

pub fn observe_upload_duration(duration: f64) {
    UPLOAD_DURATION.observe(duration);
}
