//! # HTTP Source Fetcher
//!
//! Fetches raw file content over HTTP from GitHub, GitLab and Gitea APIs, or
//! from a direct repository link.
//!
//! | Strategy | Request |
//! |----------|---------|
//! | GitHub   | `{address}/repos/{owner}/{repo}/contents/{path}?ref={branch}` |
//! | GitLab   | `{address}/api/v4/projects/{owner%2Frepo}/repository/files/{path}/raw?ref={branch}` |
//! | Gitea    | `{address}/api/v1/repos/{owner}/{repo}/raw/{path}?ref={branch}` |
//! | Link     | github.com: `raw.githubusercontent.com/{owner}/{repo}/{branch}/{path}`, else `{link}/-/raw/{branch}/{path}` |

use super::error::FetchError;
use super::SourceFetcher;
use crate::config::{CodehostEntry, CodehostKind, CodehostRegistry};
use crate::constants::{DEFAULT_BRANCH_REF, GITHUB_API_ADDRESS, GITHUB_RAW_ADDRESS};
use crate::model::ValuesSource;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Url;
use std::time::Instant;
use tracing::{debug, field, info_span, Instrument};

const GITHUB_RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const ACCEPT_HEADER: &str = "accept";
const AUTHORIZATION_HEADER: &str = "authorization";
const GITLAB_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Upper bound for pre-allocating the body buffer from Content-Length
const MAX_PREALLOC_BYTES: u64 = 1 << 20;

/// A fully resolved GET request for one source
struct ResolvedRequest {
    url: Url,
    headers: Vec<(&'static str, String)>,
}

/// [`SourceFetcher`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpSourceFetcher {
    client: reqwest::Client,
    registry: CodehostRegistry,
    github_raw_address: String,
}

impl HttpSourceFetcher {
    /// Build a fetcher with its own HTTP client
    pub fn new(registry: CodehostRegistry, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self::with_client(client, registry))
    }

    pub fn with_client(client: reqwest::Client, registry: CodehostRegistry) -> Self {
        Self {
            client,
            registry,
            github_raw_address: GITHUB_RAW_ADDRESS.to_string(),
        }
    }

    /// Override where direct github.com links are served from
    #[must_use]
    pub fn with_github_raw_address(mut self, address: impl Into<String>) -> Self {
        self.github_raw_address = address.into();
        self
    }

    fn resolve(&self, source: &ValuesSource) -> Result<ResolvedRequest, FetchError> {
        if source.codehost_id != 0 {
            let entry = self
                .registry
                .get(source.codehost_id)
                .ok_or_else(|| FetchError::UnknownCodehost {
                    codehost_id: source.codehost_id,
                    path: source.path.clone(),
                })?;
            return resolve_codehost(entry, source);
        }
        match source.direct_link() {
            Some(link) => self.resolve_link(link, source),
            None => Err(FetchError::NoDestination {
                path: source.path.clone(),
            }),
        }
    }

    fn resolve_link(&self, link: &str, source: &ValuesSource) -> Result<ResolvedRequest, FetchError> {
        let trimmed = link.trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let link_url = parse_url(trimmed, source)?;
        let branch = if source.branch.trim().is_empty() {
            DEFAULT_BRANCH_REF
        } else {
            source.branch.trim()
        };

        let url = if matches!(link_url.host_str(), Some("github.com" | "www.github.com")) {
            let segments: Vec<&str> = link_url
                .path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                .unwrap_or_default();
            let [owner, repo, ..] = segments.as_slice() else {
                return Err(FetchError::InvalidUrl {
                    path: source.path.clone(),
                    reason: "GitHub link must name an owner and a repository".to_string(),
                });
            };
            let mut url = parse_url(&self.github_raw_address, source)?;
            let segments = [*owner, *repo]
                .into_iter()
                .chain(branch.split('/'))
                .chain(file_segments(&source.path));
            append_segments(&mut url, source, segments)?;
            url
        } else {
            let mut url = link_url;
            let segments = ["-", "raw"]
                .into_iter()
                .chain(branch.split('/'))
                .chain(file_segments(&source.path));
            append_segments(&mut url, source, segments)?;
            url
        };

        Ok(ResolvedRequest {
            url,
            headers: Vec::new(),
        })
    }
}

fn resolve_codehost(entry: &CodehostEntry, source: &ValuesSource) -> Result<ResolvedRequest, FetchError> {
    let address = match (entry.kind, entry.address.trim()) {
        (CodehostKind::Github, "") => GITHUB_API_ADDRESS,
        (_, "") => {
            return Err(FetchError::InvalidUrl {
                path: source.path.clone(),
                reason: format!("codehost {} has no address", entry.id),
            })
        }
        (_, address) => address,
    };
    let mut url = parse_url(address, source)?;
    let token = entry
        .access_token
        .as_deref()
        .filter(|token| !token.is_empty());
    let mut headers = Vec::new();

    match entry.kind {
        CodehostKind::Github => {
            let segments = ["repos", source.owner.as_str(), source.repo.as_str(), "contents"]
                .into_iter()
                .chain(file_segments(&source.path));
            append_segments(&mut url, source, segments)?;
            headers.push((ACCEPT_HEADER, GITHUB_RAW_MEDIA_TYPE.to_string()));
            if let Some(token) = token {
                headers.push((AUTHORIZATION_HEADER, format!("Bearer {token}")));
            }
        }
        CodehostKind::Gitlab => {
            let project = format!("{}/{}", source.owner, source.repo);
            let file = source.path.trim_start_matches('/');
            // Project and file path are single, %2F-encoded segments
            let segments = ["api", "v4", "projects", project.as_str(), "repository", "files", file, "raw"];
            append_segments(&mut url, source, segments)?;
            if let Some(token) = token {
                headers.push((GITLAB_TOKEN_HEADER, token.to_string()));
            }
        }
        CodehostKind::Gitea => {
            let segments = ["api", "v1", "repos", source.owner.as_str(), source.repo.as_str(), "raw"]
                .into_iter()
                .chain(file_segments(&source.path));
            append_segments(&mut url, source, segments)?;
            if let Some(token) = token {
                headers.push((AUTHORIZATION_HEADER, format!("token {token}")));
            }
        }
    }

    let branch = source.branch.trim();
    if !branch.is_empty() {
        url.query_pairs_mut().append_pair("ref", branch);
    }

    Ok(ResolvedRequest { url, headers })
}

fn parse_url(address: &str, source: &ValuesSource) -> Result<Url, FetchError> {
    Url::parse(address).map_err(|e| FetchError::InvalidUrl {
        path: source.path.clone(),
        reason: format!("'{address}': {e}"),
    })
}

fn append_segments<'s>(
    url: &mut Url,
    source: &ValuesSource,
    segments: impl IntoIterator<Item = &'s str>,
) -> Result<(), FetchError> {
    url.path_segments_mut()
        .map_err(|()| FetchError::InvalidUrl {
            path: source.path.clone(),
            reason: "address cannot be used as a base URL".to_string(),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(())
}

fn file_segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_start_matches('/').split('/')
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn download(&self, source: &ValuesSource) -> Result<Vec<u8>, FetchError> {
        let request = self.resolve(source)?;
        let span = info_span!(
            "source.download",
            source.path = %source.path,
            source.codehost_id = source.codehost_id,
            http.status_code = field::Empty,
            operation.duration_ms = field::Empty,
            operation.success = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        let result = async {
            debug!("GET {}", request.url);
            let mut builder = self.client.get(request.url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(*name, value);
            }

            let response = builder.send().await.map_err(|source_err| FetchError::Request {
                path: source.path.clone(),
                source: source_err,
            })?;

            let status = response.status();
            tracing::Span::current().record("http.status_code", status.as_u16());
            if !status.is_success() {
                return Err(FetchError::Status {
                    path: source.path.clone(),
                    status: status.as_u16(),
                });
            }

            let expected = response.content_length();
            let mut body = Vec::with_capacity(expected.unwrap_or(0).min(MAX_PREALLOC_BYTES) as usize);
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|source_err| FetchError::Request {
                    path: source.path.clone(),
                    source: source_err,
                })?;
                body.extend_from_slice(&chunk);
            }

            if let Some(expected) = expected {
                let received = body.len() as u64;
                if received != expected {
                    return Err(FetchError::Partial {
                        path: source.path.clone(),
                        expected,
                        received,
                    });
                }
            }

            debug!("Fetched {} bytes for {}", body.len(), source.path);
            Ok(body)
        }
        .instrument(span)
        .await;

        span_clone.record("operation.duration_ms", start.elapsed().as_millis() as u64);
        span_clone.record("operation.success", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CodehostRegistry {
        let yaml = r"
codehosts:
  - id: 1
    type: github
    accessToken: ghp_test
  - id: 2
    type: gitlab
    address: https://gitlab.example.com
    accessToken: glpat
  - id: 3
    type: gitea
    address: https://gitea.example.com/
";
        CodehostRegistry::from_yaml(std::path::Path::new("codehosts.yaml"), yaml)
            .expect("registry should parse")
    }

    fn fetcher() -> HttpSourceFetcher {
        HttpSourceFetcher::with_client(reqwest::Client::new(), registry())
    }

    fn source(codehost_id: u64, path: &str) -> ValuesSource {
        ValuesSource {
            codehost_id,
            owner: "acme".to_string(),
            repo: "charts".to_string(),
            branch: "main".to_string(),
            path: path.to_string(),
            repo_link: None,
        }
    }

    fn link(repo_link: &str, branch: &str, path: &str) -> ValuesSource {
        ValuesSource {
            branch: branch.to_string(),
            path: path.to_string(),
            repo_link: Some(repo_link.to_string()),
            ..ValuesSource::default()
        }
    }

    #[test]
    fn test_github_contents_url() {
        let request = fetcher()
            .resolve(&source(1, "deploy/values.yaml"))
            .expect("should resolve");
        assert_eq!(
            request.url.as_str(),
            "https://api.github.com/repos/acme/charts/contents/deploy/values.yaml?ref=main"
        );
        assert!(request
            .headers
            .iter()
            .any(|(name, value)| *name == "authorization" && value == "Bearer ghp_test"));
        assert!(request
            .headers
            .iter()
            .any(|(name, value)| *name == "accept" && value == GITHUB_RAW_MEDIA_TYPE));
    }

    #[test]
    fn test_gitlab_url_encodes_project_and_path() {
        let request = fetcher()
            .resolve(&source(2, "deploy/values.yaml"))
            .expect("should resolve");
        assert_eq!(
            request.url.as_str(),
            "https://gitlab.example.com/api/v4/projects/acme%2Fcharts/repository/files/deploy%2Fvalues.yaml/raw?ref=main"
        );
        assert_eq!(
            request.headers,
            vec![(GITLAB_TOKEN_HEADER, "glpat".to_string())]
        );
    }

    #[test]
    fn test_gitea_url_without_token() {
        let request = fetcher()
            .resolve(&source(3, "values.yaml"))
            .expect("should resolve");
        assert_eq!(
            request.url.as_str(),
            "https://gitea.example.com/api/v1/repos/acme/charts/raw/values.yaml?ref=main"
        );
        assert!(request.headers.is_empty());
    }

    #[test]
    fn test_empty_branch_omits_ref_for_codehost() {
        let mut src = source(3, "values.yaml");
        src.branch = String::new();
        let request = fetcher().resolve(&src).expect("should resolve");
        assert!(request.url.query().is_none());
    }

    #[test]
    fn test_github_link_resolves_to_raw_host() {
        let request = fetcher()
            .resolve(&link("https://github.com/acme/charts", "", "values.yaml"))
            .expect("should resolve");
        assert_eq!(
            request.url.as_str(),
            "https://raw.githubusercontent.com/acme/charts/HEAD/values.yaml"
        );
    }

    #[test]
    fn test_other_link_uses_raw_route() {
        let request = fetcher()
            .resolve(&link(
                "https://gitlab.example.com/group/charts.git",
                "release/1.0",
                "env/prod.yaml",
            ))
            .expect("should resolve");
        assert_eq!(
            request.url.as_str(),
            "https://gitlab.example.com/group/charts/-/raw/release/1.0/env/prod.yaml"
        );
    }

    #[test]
    fn test_github_link_without_repo_is_invalid() {
        let err = fetcher()
            .resolve(&link("https://github.com/acme", "main", "values.yaml"))
            .err()
            .expect("should fail");
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_unknown_codehost() {
        let err = fetcher()
            .resolve(&source(42, "values.yaml"))
            .err()
            .expect("should fail");
        assert!(matches!(err, FetchError::UnknownCodehost { codehost_id: 42, .. }));
        assert_eq!(err.path(), "values.yaml");
    }

    #[test]
    fn test_no_destination() {
        let err = fetcher()
            .resolve(&ValuesSource {
                path: "values.yaml".to_string(),
                ..ValuesSource::default()
            })
            .err()
            .expect("should fail");
        assert!(matches!(err, FetchError::NoDestination { .. }));
    }
}
