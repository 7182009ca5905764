//! # Codehost Registry
//!
//! Pre-configured version-control hosts that values files can be fetched from.
//!
//! ```yaml
//! codehosts:
//!   - id: 1
//!     type: github
//!     address: https://api.github.com
//!     accessToken: ghp_xxx
//!   - id: 2
//!     type: gitlab
//!     address: https://gitlab.example.com
//! ```
//!
//! Access tokens are read as given; issuing and rotating them is the
//! responsibility of whoever writes the file.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read codehost config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse codehost config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("codehost id {0} is declared more than once")]
    DuplicateId(u64),
    #[error("codehost id 0 is reserved for \"unset\"")]
    ReservedId,
    #[error("invalid context file {path}: {message}")]
    Context { path: PathBuf, message: String },
}

impl ConfigError {
    /// Configuration problems never resolve by retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, ConfigError::Read { source, .. } if source.kind() == std::io::ErrorKind::Interrupted)
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            ConfigError::Read { .. } => {
                "Check that the file exists and is readable by the archiver process.".to_string()
            }
            ConfigError::Parse { .. } => {
                "Fix the YAML syntax. Each codehost needs 'id', 'type' (github, gitlab or gitea) and 'address'.".to_string()
            }
            ConfigError::DuplicateId(_) => {
                "Give every codehost entry a unique id.".to_string()
            }
            ConfigError::ReservedId => {
                "Use a codehost id greater than 0; 0 means no codehost is selected.".to_string()
            }
            ConfigError::Context { .. } => {
                "The archival context must provide pipelineName, taskId and storageUri.".to_string()
            }
        }
    }
}

/// Supported codehost APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodehostKind {
    Github,
    Gitlab,
    Gitea,
}

impl CodehostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodehostKind::Github => "github",
            CodehostKind::Gitlab => "gitlab",
            CodehostKind::Gitea => "gitea",
        }
    }
}

/// A single codehost entry
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodehostEntry {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: CodehostKind,
    /// API base address. Defaults to the public API for GitHub.
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl fmt::Debug for CodehostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodehostEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("address", &self.address)
            .field("has_token", &self.access_token.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    codehosts: Vec<CodehostEntry>,
}

/// Codehosts indexed by id
#[derive(Debug, Clone, Default)]
pub struct CodehostRegistry {
    entries: HashMap<u64, CodehostEntry>,
}

impl CodehostRegistry {
    /// Build a registry from entries, rejecting duplicate and reserved ids
    pub fn from_entries(entries: Vec<CodehostEntry>) -> Result<Self, ConfigError> {
        let mut map = HashMap::with_capacity(entries.len());
        for entry in entries {
            if entry.id == 0 {
                return Err(ConfigError::ReservedId);
            }
            let id = entry.id;
            if map.insert(id, entry).is_some() {
                return Err(ConfigError::DuplicateId(id));
            }
        }
        Ok(Self { entries: map })
    }

    /// Parse a registry from YAML text
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let file: RegistryFile =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_entries(file.codehosts)
    }

    /// Load a registry from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(path, &content)
    }

    pub fn get(&self, id: u64) -> Option<&CodehostEntry> {
        self.entries.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
