//! # Codehost Mock
//!
//! Raw-file endpoints of the supported codehosts, backed by an in-memory file
//! table keyed by `owner/repo`, ref and path:
//!
//! - GitHub: `GET /repos/{owner}/{repo}/contents/{path}?ref=` (`Authorization: Bearer`)
//! - GitLab: `GET /api/v4/projects/{owner%2Frepo}/repository/files/{path}/raw?ref=` (`PRIVATE-TOKEN`)
//! - Gitea: `GET /api/v1/repos/{owner}/{repo}/raw/{path}?ref=` (`Authorization: token`)
//! - Direct links: `GET /{owner}/{repo}/-/raw/{ref}/{path}` and the
//!   raw.githubusercontent.com layout `GET /{owner}/{repo}/{ref}/{path}`
//!
//! A missing or `HEAD` ref resolves to the default branch `main`.

use crate::{health_check, logging_middleware};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::trace::TraceLayer;

const DEFAULT_BRANCH: &str = "main";

#[derive(Debug, Default)]
struct CodehostState {
    /// (owner/repo, ref, path) -> content
    files: HashMap<(String, String, String), Bytes>,
    failures: HashMap<String, StatusCode>,
    token: Option<String>,
    requests: Vec<String>,
}

/// Which auth header a route expects
#[derive(Debug, Clone, Copy)]
enum AuthScheme {
    Bearer,
    PrivateToken,
    Token,
    None,
}

#[derive(Debug, Deserialize)]
struct RefQuery {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
}

/// In-memory codehost
#[derive(Debug, Clone, Default)]
pub struct CodehostMock {
    state: Arc<RwLock<CodehostState>>,
}

impl CodehostMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require this token on API routes
    #[must_use]
    pub fn with_token(self, token: &str) -> Self {
        self.write(|state| state.token = Some(token.to_string()));
        self
    }

    /// Serve `content` for `project` (`owner/repo`) at `git_ref` and `path`
    #[must_use]
    pub fn with_file(self, project: &str, git_ref: &str, path: &str, content: &str) -> Self {
        self.write(|state| {
            state.files.insert(
                (project.to_string(), git_ref.to_string(), path.to_string()),
                Bytes::from(content.to_string()),
            );
        });
        self
    }

    /// Answer every request for `path` with `status`
    pub fn fail_path(&self, path: &str, status: StatusCode) {
        self.write(|state| {
            state.failures.insert(path.to_string(), status);
        });
    }

    /// Paths requested so far, in order
    pub fn requested_paths(&self) -> Vec<String> {
        self.read(|state| state.requests.clone())
    }

    /// Load files laid out as `{root}/{owner}/{repo}/{ref}/{path}`
    pub fn load_dir(self, root: &std::path::Path) -> std::io::Result<Self> {
        let mut files = Vec::new();
        collect_files(root, &mut files)?;
        for file in files {
            let Ok(relative) = file.strip_prefix(root) else {
                continue;
            };
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if let [owner, repo, git_ref, rest @ ..] = parts.as_slice() {
                if rest.is_empty() {
                    continue;
                }
                let content = std::fs::read(&file)?;
                self.write(|state| {
                    state.files.insert(
                        (format!("{owner}/{repo}"), git_ref.clone(), rest.join("/")),
                        Bytes::from(content),
                    );
                });
            }
        }
        Ok(self)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/repos/{owner}/{repo}/contents/{*path}", get(github_contents))
            .route(
                "/api/v4/projects/{project}/repository/files/{file}/raw",
                get(gitlab_file_raw),
            )
            .route("/api/v1/repos/{owner}/{repo}/raw/{*path}", get(gitea_raw))
            .fallback(raw_link)
            .layer(axum::middleware::from_fn(logging_middleware))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    fn serve(
        &self,
        headers: &HeaderMap,
        scheme: AuthScheme,
        project: &str,
        git_ref: Option<&str>,
        path: &str,
    ) -> Response {
        self.write(|state| {
            state.requests.push(path.to_string());

            if let Some(token) = &state.token {
                if !authorized(headers, scheme, token) {
                    return message(StatusCode::UNAUTHORIZED, "401 Unauthorized");
                }
            }
            if let Some(status) = state.failures.get(path) {
                return message(*status, "injected failure");
            }

            let git_ref = match git_ref {
                None | Some("" | "HEAD") => DEFAULT_BRANCH,
                Some(other) => other,
            };
            let key = (project.to_string(), git_ref.to_string(), path.to_string());
            match state.files.get(&key) {
                Some(content) => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    content.clone(),
                )
                    .into_response(),
                None => message(StatusCode::NOT_FOUND, "404 File Not Found"),
            }
        })
    }

    fn read<T>(&self, f: impl FnOnce(&CodehostState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut CodehostState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

fn collect_files(dir: &std::path::Path, out: &mut Vec<std::path::PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

fn authorized(headers: &HeaderMap, scheme: AuthScheme, token: &str) -> bool {
    let header_value = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    match scheme {
        AuthScheme::Bearer => header_value("authorization") == Some(format!("Bearer {token}").as_str()),
        AuthScheme::Token => header_value("authorization") == Some(format!("token {token}").as_str()),
        AuthScheme::PrivateToken => header_value("private-token") == Some(token),
        AuthScheme::None => true,
    }
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn github_contents(
    State(mock): State<CodehostMock>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(query): Query<RefQuery>,
    headers: HeaderMap,
) -> Response {
    let accepts_raw = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/vnd.github.raw"));
    if !accepts_raw {
        return message(StatusCode::NOT_ACCEPTABLE, "only raw media type is mocked");
    }
    mock.serve(
        &headers,
        AuthScheme::Bearer,
        &format!("{owner}/{repo}"),
        query.git_ref.as_deref(),
        &path,
    )
}

async fn gitlab_file_raw(
    State(mock): State<CodehostMock>,
    Path((project, file)): Path<(String, String)>,
    Query(query): Query<RefQuery>,
    headers: HeaderMap,
) -> Response {
    mock.serve(
        &headers,
        AuthScheme::PrivateToken,
        &project,
        query.git_ref.as_deref(),
        &file,
    )
}

async fn gitea_raw(
    State(mock): State<CodehostMock>,
    Path((owner, repo, path)): Path<(String, String, String)>,
    Query(query): Query<RefQuery>,
    headers: HeaderMap,
) -> Response {
    mock.serve(
        &headers,
        AuthScheme::Token,
        &format!("{owner}/{repo}"),
        query.git_ref.as_deref(),
        &path,
    )
}

/// Direct links: `/{owner}/{repo}/-/raw/{ref}/{path}` or `/{owner}/{repo}/{ref}/{path}`
async fn raw_link(State(mock): State<CodehostMock>, uri: Uri, headers: HeaderMap) -> Response {
    let segments: Vec<&str> = uri.path().trim_start_matches('/').split('/').collect();
    let (owner, repo, rest) = match segments.as_slice() {
        [owner, repo, "-", "raw", rest @ ..] => (*owner, *repo, rest),
        [owner, repo, rest @ ..] => (*owner, *repo, rest),
        _ => return message(StatusCode::NOT_FOUND, "404 Not Found"),
    };
    let [git_ref, path @ ..] = rest else {
        return message(StatusCode::NOT_FOUND, "404 Not Found");
    };
    if path.is_empty() {
        return message(StatusCode::NOT_FOUND, "404 Not Found");
    }
    mock.serve(
        &headers,
        AuthScheme::None,
        &format!("{owner}/{repo}"),
        Some(*git_ref),
        &path.join("/"),
    )
}
