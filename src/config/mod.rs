//! # Archiver Configuration
//!
//! Process-level configuration loaded from environment variables, plus the
//! codehost registry loaded from a YAML file.
//!
//! All settings have sensible defaults. CLI flags override environment values.

mod archiver;
mod codehost;

pub use archiver::ArchiverConfig;
pub use codehost::{CodehostEntry, CodehostKind, CodehostRegistry, ConfigError};

/// Read environment variable or return default value
pub(crate) fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Read a non-empty environment variable
pub(crate) fn env_var_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
