//! # Values Aggregation
//!
//! Fetches configuration-override files and merges them into a single YAML
//! document. Fetches run one after another in input order, then a single fold
//! applies them with later files taking precedence.

mod aggregator;
mod error;
pub mod merge;

pub use aggregator::ValuesAggregator;
pub use error::AggregateError;
pub use merge::{merge_documents, merge_values};
