//! # Values Sources
//!
//! Capability to fetch one file from a codehost or a direct repository link.

mod error;
mod http;

pub use error::FetchError;
pub use http::HttpSourceFetcher;

use crate::model::ValuesSource;
use async_trait::async_trait;

/// Retrieves a single file's bytes
///
/// A file that exists but has no content yields an empty buffer, not an
/// error; callers decide whether that matters.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn download(&self, source: &ValuesSource) -> Result<Vec<u8>, FetchError>;
}

#[async_trait]
impl<T: SourceFetcher + ?Sized> SourceFetcher for std::sync::Arc<T> {
    async fn download(&self, source: &ValuesSource) -> Result<Vec<u8>, FetchError> {
        (**self).download(source).await
    }
}

/// Metrics label for how a source is resolved
pub(crate) fn strategy_label(source: &ValuesSource) -> &'static str {
    if source.codehost_id != 0 {
        "codehost"
    } else {
        "link"
    }
}
