//! # Data Model
//!
//! Inputs handed to the archiver and the values aggregator by the surrounding
//! pipeline runner. Field names follow the runner's camelCase wire format.

mod archival;
mod values;

pub use archival::{ArchivalContext, FileArchive, TestArchive};
pub use values::{split_values_paths, MergedValues, ValuesRequest, ValuesSource};
