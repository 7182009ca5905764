//! # Object Store Mock
//!
//! Path-style S3 subset: `PUT /{bucket}/{key}` stores an object and
//! `GET /{bucket}/{key}` returns it. Errors use the S3 XML error body so SDK
//! clients surface the status and code.

use crate::{health_check, logging_middleware};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Debug, Default)]
struct StoreState {
    buckets: HashMap<String, BTreeMap<String, Bytes>>,
    put_failure: Option<StatusCode>,
    put_attempts: u64,
}

/// In-memory S3-compatible store
#[derive(Debug, Clone, Default)]
pub struct ObjectStoreMock {
    state: Arc<RwLock<StoreState>>,
}

impl ObjectStoreMock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty bucket
    #[must_use]
    pub fn with_bucket(self, bucket: &str) -> Self {
        self.write(|state| {
            state.buckets.entry(bucket.to_string()).or_default();
        });
        self
    }

    /// Answer every subsequent upload with `status`
    pub fn fail_puts_with(&self, status: StatusCode) {
        self.write(|state| state.put_failure = Some(status));
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.read(|state| state.buckets.get(bucket)?.get(key).cloned())
    }

    /// Keys in `bucket`, sorted
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.read(|state| {
            state
                .buckets
                .get(bucket)
                .map(|objects| objects.keys().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Number of upload requests received, successful or not
    pub fn put_attempts(&self) -> u64 {
        self.read(|state| state.put_attempts)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/{bucket}/{*key}", get(get_object).put(put_object))
            .layer(axum::middleware::from_fn(logging_middleware))
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> T) -> T {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

async fn put_object(
    State(store): State<ObjectStoreMock>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    store.write(|state| {
        state.put_attempts += 1;

        if !headers.contains_key(header::AUTHORIZATION) {
            return s3_error(StatusCode::FORBIDDEN, "AccessDenied", "request is not signed");
        }
        if let Some(status) = state.put_failure {
            return s3_error(status, error_code(status), "injected failure");
        }
        let Some(objects) = state.buckets.get_mut(&bucket) else {
            return s3_error(
                StatusCode::NOT_FOUND,
                "NoSuchBucket",
                "The specified bucket does not exist",
            );
        };

        info!("Stored {} bytes at {}/{}", body.len(), bucket, key);
        let etag = format!("\"{}-mock\"", body.len());
        objects.insert(key, body);
        (StatusCode::OK, [(header::ETAG, etag)]).into_response()
    })
}

async fn get_object(
    State(store): State<ObjectStoreMock>,
    Path((bucket, key)): Path<(String, String)>,
) -> Response {
    match store.object(&bucket, &key) {
        Some(body) => (StatusCode::OK, body).into_response(),
        None => s3_error(
            StatusCode::NOT_FOUND,
            "NoSuchKey",
            "The specified key does not exist.",
        ),
    }
}

fn error_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::SERVICE_UNAVAILABLE => "SlowDown",
        StatusCode::FORBIDDEN => "AccessDenied",
        StatusCode::NOT_FOUND => "NoSuchBucket",
        _ if status.is_server_error() => "InternalError",
        _ => "InvalidRequest",
    }
}

fn s3_error(status: StatusCode, code: &str, message: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Error><Code>{code}</Code><Message>{message}</Message><RequestId>mock</RequestId></Error>"
    );
    (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
