//! # Runtime Module
//!
//! Process bootstrap and exit-code policy for the CLI.

pub mod error_policy;
pub mod initialization;

pub use error_policy::*;
pub use initialization::*;
