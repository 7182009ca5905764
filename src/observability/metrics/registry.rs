//! # Metrics Registry
//!
//! Prometheus metrics registry setup, registration and text export.

use prometheus::core::Collector;
use prometheus::{Encoder, Registry, TextEncoder};
use std::path::Path;
use std::sync::LazyLock;

/// Global Prometheus metrics registry
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Register all metrics with the Prometheus registry
///
/// Safe to call more than once; already registered collectors are skipped.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> prometheus::Result<()> {
    super::archive_metrics::register_archive_metrics()?;
    super::values_metrics::register_values_metrics()?;
    Ok(())
}

/// Register one collector, tolerating repeated registration
pub(crate) fn register_collector<C: Collector + Clone + 'static>(collector: &C) -> prometheus::Result<()> {
    match REGISTRY.register(Box::new(collector.clone())) {
        Err(prometheus::Error::AlreadyReg) => Ok(()),
        other => other,
    }
}

/// Render the registry in Prometheus text exposition format
pub fn gather_text() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

/// Write the registry to a textfile-collector file
///
/// Writes to a sibling temp file first so a scraper never reads a partial file.
pub fn write_textfile(path: &Path) -> anyhow::Result<()> {
    use anyhow::Context;

    let text = gather_text().context("Failed to encode metrics")?;
    let tmp = path.with_extension("prom.tmp");
    std::fs::write(&tmp, text)
        .with_context(|| format!("Failed to write metrics to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move metrics file into place at {}", path.display()))?;
    Ok(())
}
