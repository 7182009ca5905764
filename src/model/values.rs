//! # Values Sources
//!
//! Where configuration-override files live, and the merged result.

use crate::constants::VALUES_PATH_DELIMITER;
use serde::{Deserialize, Serialize};

/// One file to fetch from a codehost or a direct repository link
///
/// Exactly one resolution strategy applies: a non-zero `codehost_id` with
/// owner/repo/branch/path, or a `repo_link`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesSource {
    /// 0 means unset
    #[serde(default, rename = "codehostId", alias = "codehostID")]
    pub codehost_id: u64,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: String,
    pub path: String,
    #[serde(default)]
    pub repo_link: Option<String>,
}

impl ValuesSource {
    /// Non-empty direct link, if any
    pub fn direct_link(&self) -> Option<&str> {
        self.repo_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }

    /// Whether a codehost id or a direct link identifies where to fetch from
    pub fn has_destination(&self) -> bool {
        self.codehost_id != 0 || self.direct_link().is_some()
    }
}

/// Values-resolution request as received from the request surface
///
/// `values_paths` is a comma-delimited list; order is significant because
/// later files override earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesRequest {
    #[serde(default, rename = "codehostId", alias = "codehostID")]
    pub codehost_id: u64,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub repo_link: Option<String>,
    #[serde(default)]
    pub values_paths: String,
}

impl ValuesRequest {
    /// Split `values_paths` into ordered sources sharing the request's
    /// destination. Segments are trimmed and empty segments dropped.
    pub fn into_sources(self) -> Vec<ValuesSource> {
        let Self {
            codehost_id,
            owner,
            repo,
            branch,
            repo_link,
            values_paths,
        } = self;

        split_values_paths(&values_paths)
            .map(|path| ValuesSource {
                codehost_id,
                owner: owner.clone(),
                repo: repo.clone(),
                branch: branch.clone(),
                path: path.to_string(),
                repo_link: repo_link.clone(),
            })
            .collect()
    }
}

/// Split a delimiter-separated path list, preserving order
pub fn split_values_paths(paths: &str) -> impl Iterator<Item = &str> {
    paths
        .split(VALUES_PATH_DELIMITER)
        .map(str::trim)
        .filter(|path| !path.is_empty())
}

/// Merged values document
///
/// Built fresh per request and immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedValues(String);

impl MergedValues {
    pub(crate) fn new(text: String) -> Self {
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for MergedValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_sources_preserves_order() {
        let request = ValuesRequest {
            codehost_id: 3,
            owner: "acme".to_string(),
            repo: "charts".to_string(),
            branch: "main".to_string(),
            repo_link: None,
            values_paths: "base/values.yaml,overlays/prod.yaml,secrets.yaml".to_string(),
        };

        let sources = request.into_sources();
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["base/values.yaml", "overlays/prod.yaml", "secrets.yaml"]
        );
        assert!(sources
            .iter()
            .all(|s| s.codehost_id == 3 && s.owner == "acme" && s.branch == "main"));
    }

    #[test]
    fn test_into_sources_trims_and_drops_empty_segments() {
        let request = ValuesRequest {
            values_paths: " a.yaml , ,b.yaml,".to_string(),
            ..ValuesRequest::default()
        };
        let sources = request.into_sources();
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["a.yaml", "b.yaml"]);
    }

    #[test]
    fn test_into_sources_empty_list() {
        assert!(ValuesRequest::default().into_sources().is_empty());
    }

    #[test]
    fn test_has_destination() {
        let mut source = ValuesSource {
            path: "values.yaml".to_string(),
            ..ValuesSource::default()
        };
        assert!(!source.has_destination());

        source.repo_link = Some("   ".to_string());
        assert!(!source.has_destination());

        source.repo_link = Some("https://github.com/acme/charts".to_string());
        assert!(source.has_destination());

        source.repo_link = None;
        source.codehost_id = 1;
        assert!(source.has_destination());
    }

    #[test]
    fn test_deserialize_request() {
        let json = r#"{"codehostID":2,"owner":"acme","repo":"charts","branch":"dev","valuesPaths":"a.yaml,b.yaml"}"#;
        let request: ValuesRequest = serde_json::from_str(json).expect("request should parse");
        assert_eq!(request.codehost_id, 2);
        assert_eq!(request.into_sources().len(), 2);
    }
}
