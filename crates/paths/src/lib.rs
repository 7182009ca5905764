//! Object key path definitions for archived pipeline artifacts
//!
//! This crate centralizes the remote object key layout so the archiver and any
//! external tooling that lists or restores artifacts agree on it.
//!
//! ## Key format
//!
//! ```text
//! [subfolder/]pipelineName/taskID/{file|test}/objectName
//! ```
//!
//! The layout is a compatibility contract: changing it orphans every object
//! archived under the previous format.
//!
//! ## Kind tags
//!
//! The `file|test` segment is a [`KindTag`]. It is always derived
//! ([`KindTag::for_test_archive`] or [`KindTag::File`] for explicit file
//! artifacts), never accepted as free text.

pub mod key;
pub mod kind;

pub use key::{compose_subfolder, join_object_key, ObjectKey};
pub use kind::KindTag;
