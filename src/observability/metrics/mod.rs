//! # Metrics Module
//!
//! Prometheus metrics, organized by responsibility.
//!
//! ## Sub-modules
//!
//! - `registry` - Metrics registry setup, registration and text export
//! - `archive_metrics` - Archive runs, uploads, skips
//! - `values_metrics` - Source fetches and values aggregation

pub mod archive_metrics;
pub mod registry;
pub mod values_metrics;

pub use archive_metrics::*;
pub use registry::*;
pub use values_metrics::*;
