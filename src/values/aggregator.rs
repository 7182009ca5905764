//! # Values Aggregator
//!
//! Fetches values files in order and folds them into one document.

use super::error::AggregateError;
use super::merge::merge_documents;
use crate::model::{MergedValues, ValuesRequest, ValuesSource};
use crate::observability::metrics;
use crate::source::{strategy_label, SourceFetcher};
use serde_yaml::Value;
use std::time::Instant;
use tracing::{error, field, info, info_span, Instrument};

/// Merges values files fetched through `F`
#[derive(Debug, Clone)]
pub struct ValuesAggregator<F> {
    fetcher: F,
}

impl<F: SourceFetcher> ValuesAggregator<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Split a request's path list and aggregate it
    pub async fn aggregate_request(
        &self,
        request: ValuesRequest,
    ) -> Result<MergedValues, AggregateError> {
        let sources = request.into_sources();
        self.aggregate(&sources).await
    }

    /// Fetch `sources` sequentially and merge them, later sources winning
    ///
    /// Inputs are validated before the first fetch. Empty files are skipped.
    /// A single failed fetch fails the whole call and nothing fetched so far
    /// is returned.
    pub async fn aggregate(&self, sources: &[ValuesSource]) -> Result<MergedValues, AggregateError> {
        let span = info_span!(
            "values.aggregate",
            source.count = sources.len(),
            operation.duration_ms = field::Empty,
            operation.success = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        let result = async {
            validate(sources)?;

            let mut contents = Vec::with_capacity(sources.len());
            for source in sources {
                metrics::increment_source_fetches(strategy_label(source));
                let content = self.fetcher.download(source).await.map_err(|e| {
                    metrics::increment_source_fetch_errors();
                    AggregateError::Fetch {
                        path: source.path.clone(),
                        source: e,
                    }
                })?;
                contents.push((source, content));
            }

            let mut documents = Vec::with_capacity(contents.len());
            for (source, content) in contents {
                match parse_document(source, &content)? {
                    Some(document) => documents.push(document),
                    None => {
                        info!("Values file {} is empty, skipping", source.path);
                        metrics::increment_empty_sources();
                    }
                }
            }

            render(merge_documents(documents))
        }
        .instrument(span)
        .await;

        let elapsed = start.elapsed();
        span_clone.record("operation.duration_ms", elapsed.as_millis() as u64);
        span_clone.record("operation.success", result.is_ok());
        metrics::observe_aggregation_duration(elapsed.as_secs_f64());
        match &result {
            Ok(_) => metrics::increment_aggregations(),
            Err(e) => {
                metrics::increment_aggregation_errors(e.reason());
                error!("Values aggregation failed: {} ({})", e, e.remediation());
            }
        }
        result
    }
}

fn validate(sources: &[ValuesSource]) -> Result<(), AggregateError> {
    if sources.is_empty() {
        return Err(AggregateError::InvalidInput {
            field: "valuesPaths",
            message: "at least one values path is required".to_string(),
        });
    }
    if let Some(source) = sources.iter().find(|s| !s.has_destination()) {
        return Err(AggregateError::InvalidInput {
            field: "codehostId",
            message: format!(
                "{} has neither a codehost id nor a repository link",
                source.path
            ),
        });
    }
    Ok(())
}

/// `None` for empty or comment-only files
fn parse_document(source: &ValuesSource, content: &[u8]) -> Result<Option<Value>, AggregateError> {
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let document: Value =
        serde_yaml::from_slice(content).map_err(|e| AggregateError::Parse {
            path: source.path.clone(),
            source: e,
        })?;
    Ok((!document.is_null()).then_some(document))
}

fn render(merged: Option<Value>) -> Result<MergedValues, AggregateError> {
    match merged {
        Some(value) => serde_yaml::to_string(&value)
            .map(MergedValues::new)
            .map_err(AggregateError::Serialize),
        None => Ok(MergedValues::new(String::new())),
    }
}
