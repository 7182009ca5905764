//! # Values Metrics
//!
//! Metrics for source fetches and values aggregation.

use super::registry::register_collector;
use prometheus::{Histogram, IntCounter, IntCounterVec};
use std::sync::LazyLock;

static SOURCE_FETCHES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "pipeline_archiver_source_fetches_total",
            "Total number of values file downloads by strategy (codehost, link)",
        ),
        &["strategy"],
    )
    .expect("Failed to create SOURCE_FETCHES_TOTAL metric - this should never happen")
});

static SOURCE_FETCH_ERRORS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pipeline_archiver_source_fetch_errors_total",
        "Total number of failed values file downloads",
    )
    .expect("Failed to create SOURCE_FETCH_ERRORS_TOTAL metric - this should never happen")
});

static EMPTY_SOURCES_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pipeline_archiver_empty_sources_total",
        "Total number of fetched values files skipped because they were empty",
    )
    .expect("Failed to create EMPTY_SOURCES_TOTAL metric - this should never happen")
});

static AGGREGATIONS_TOTAL: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pipeline_archiver_aggregations_total",
        "Total number of successful values aggregations",
    )
    .expect("Failed to create AGGREGATIONS_TOTAL metric - this should never happen")
});

static AGGREGATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "pipeline_archiver_aggregation_errors_total",
            "Total number of failed values aggregations by reason",
        ),
        &["reason"],
    )
    .expect("Failed to create AGGREGATION_ERRORS_TOTAL metric - this should never happen")
});

static AGGREGATION_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "pipeline_archiver_aggregation_duration_seconds",
            "Duration of values aggregation (all fetches plus merge) in seconds",
        )
        .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0]),
    )
    .expect("Failed to create AGGREGATION_DURATION metric - this should never happen")
});

/// Register values metrics with the registry
pub(crate) fn register_values_metrics() -> prometheus::Result<()> {
    register_collector(&*SOURCE_FETCHES_TOTAL)?;
    register_collector(&*SOURCE_FETCH_ERRORS_TOTAL)?;
    register_collector(&*EMPTY_SOURCES_TOTAL)?;
    register_collector(&*AGGREGATIONS_TOTAL)?;
    register_collector(&*AGGREGATION_ERRORS_TOTAL)?;
    register_collector(&*AGGREGATION_DURATION)?;
    Ok(())
}

pub fn increment_source_fetches(strategy: &str) {
    SOURCE_FETCHES_TOTAL.with_label_values(&[strategy]).inc();
}

pub fn increment_source_fetch_errors() {
    SOURCE_FETCH_ERRORS_TOTAL.inc();
}

pub fn increment_empty_sources() {
    EMPTY_SOURCES_TOTAL.inc();
}

pub fn increment_aggregations() {
    AGGREGATIONS_TOTAL.inc();
}

pub fn increment_aggregation_errors(reason: &str) {
    AGGREGATION_ERRORS_TOTAL.with_label_values(&[reason]).inc();
}

pub fn observe_aggregation_duration(duration: f64) {
    AGGREGATION_DURATION.observe(duration);
}
