//! # Initialization
//!
//! Process bootstrap: rustls crypto provider, tracing subscriber and metrics
//! registration.

use crate::config::ArchiverConfig;
use crate::observability;
use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Initialize the archiver runtime
///
/// Called once per process before any command runs.
pub fn initialize(config: &ArchiverConfig) -> Result<()> {
    // Must happen before any TLS client (S3 or codehost) is built
    install_crypto_provider();

    init_tracing(&config.log_filter, config.log_filter_override.as_deref())?;

    info!("Starting pipeline-archiver v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {:?}", config);

    observability::metrics::register_metrics().context("Failed to register metrics")?;
    Ok(())
}

/// Install ring as the process-wide rustls provider
///
/// A provider installed earlier (for example by a test harness) is kept.
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// Set up the tracing subscriber
///
/// Precedence: `--log-level`, then `RUST_LOG`, then the configured filter.
pub fn init_tracing(default_filter: &str, cli_filter: Option<&str>) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = select_filter(cli_filter, rust_log.as_deref(), default_filter);
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter '{directive}'"))?;

    // Logs go to stderr; stdout carries command output (object keys, merged values)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

fn select_filter<'a>(cli: Option<&'a str>, env: Option<&'a str>, default: &'a str) -> &'a str {
    let present = |value: &&str| !value.trim().is_empty();
    cli.filter(present)
        .or_else(|| env.filter(present))
        .unwrap_or(default)
}
