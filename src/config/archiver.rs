//! # Runtime Settings
//!
//! Settings shared by the archive and values commands.

use super::{env_var_opt, env_var_or_default};
use crate::constants::{DEFAULT_LOG_FILTER, DEFAULT_STORAGE_REGION, DEFAULT_WORKSPACE_ROOT};
use std::path::PathBuf;

/// Archiver configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
    /// Root joined in front of file-artifact locations
    pub workspace_root: PathBuf,
    /// Region used when the storage URI does not carry one
    pub storage_region: String,
    /// Codehost registry file (YAML)
    pub codehost_config: Option<PathBuf>,
    /// Prometheus textfile output written after each command
    pub metrics_file: Option<PathBuf>,
    /// User agent sent to codehosts
    pub user_agent: String,
    /// Tracing filter directive
    pub log_filter: String,
    /// Filter given on the command line; wins over `RUST_LOG`
    pub log_filter_override: Option<String>,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            storage_region: DEFAULT_STORAGE_REGION.to_string(),
            codehost_config: None,
            metrics_file: None,
            user_agent: default_user_agent(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_filter_override: None,
        }
    }
}

impl ArchiverConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            workspace_root: env_var_or_default(
                "ARCHIVER_WORKSPACE_ROOT",
                PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            ),
            storage_region: env_var_or_default(
                "ARCHIVER_STORAGE_REGION",
                DEFAULT_STORAGE_REGION.to_string(),
            ),
            codehost_config: env_var_opt("ARCHIVER_CODEHOST_CONFIG").map(PathBuf::from),
            metrics_file: env_var_opt("ARCHIVER_METRICS_FILE").map(PathBuf::from),
            user_agent: env_var_or_default("ARCHIVER_USER_AGENT", default_user_agent()),
            log_filter: env_var_or_default("ARCHIVER_LOG", DEFAULT_LOG_FILTER.to_string()),
            log_filter_override: None,
        }
    }
}

fn default_user_agent() -> String {
    format!("pipeline-archiver/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ArchiverConfig::default();
        assert_eq!(config.workspace_root, PathBuf::from("."));
        assert_eq!(config.storage_region, "us-east-1");
        assert!(config.codehost_config.is_none());
        assert!(config.metrics_file.is_none());
        assert!(config.user_agent.starts_with("pipeline-archiver/"));
    }
}
