//! Adapter integration tests with mock servers
//!
//! Organized by the remote the adapter talks to.

pub mod codehost;
pub mod common;
pub mod object_store;
