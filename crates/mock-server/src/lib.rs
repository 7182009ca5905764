//! # Mock Server
//!
//! In-memory HTTP mocks used by pipeline-archiver integration tests and for
//! local development:
//!
//! - [`object_store::ObjectStoreMock`] - path-style S3 `PUT`/`GET` of objects
//! - [`codehost::CodehostMock`] - GitHub, GitLab and Gitea raw-file APIs plus
//!   direct repository raw links
//!
//! Each mock hands out an axum [`Router`]; [`spawn`] serves it on an
//! ephemeral local port.

pub mod codehost;
pub mod object_store;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use tracing::{debug, error};

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Log every request with its response status
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    debug!("{} {} -> {}", method, uri, response.status());
    response
}

/// Serve `router` on `127.0.0.1` with an OS-assigned port
///
/// The server runs on a background task for the rest of the test.
pub async fn spawn(router: Router) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Mock server on {} stopped: {}", addr, e);
        }
    });
    Ok(addr)
}

/// Read `PORT` or fall back to `default`
pub fn port_from_env(default: u16) -> anyhow::Result<u16> {
    match std::env::var("PORT") {
        Ok(value) => value
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("PORT must be a valid u16, got '{value}': {e}")),
        Err(_) => Ok(default),
    }
}
