//! # Pipeline Archiver
//!
//! Artifact archival and remote values aggregation for pipeline steps.
//!
//! ## Overview
//!
//! 1. **Archival** - After a step runs, upload its declared file artifact (or
//!    its test output) to an S3-compatible store under
//!    `[base/]pipeline/task/{file|test}/name`
//! 2. **Values aggregation** - Fetch one or more YAML override files from a
//!    codehost (GitHub, GitLab, Gitea) or a direct repository link and deep
//!    merge them, later files winning
//!
//! Both paths are sequential per call and hold no state across calls.

pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod model;
pub mod observability;
pub mod runtime;
pub mod source;
pub mod storage;
pub mod values;
