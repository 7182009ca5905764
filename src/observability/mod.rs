//! # Observability
//!
//! Prometheus metrics for archive and values operations. Logging goes through
//! `tracing`; the subscriber is installed in [`crate::runtime::initialization`].

pub mod metrics;
