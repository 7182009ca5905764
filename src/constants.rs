//! # Constants
//!
//! Default values shared by configuration, adapters and the CLI.

/// Default workspace root for file artifacts
pub const DEFAULT_WORKSPACE_ROOT: &str = ".";

/// Region used when the storage URI does not carry one
pub const DEFAULT_STORAGE_REGION: &str = "us-east-1";

/// Default tracing filter when neither `RUST_LOG` nor `ARCHIVER_LOG` is set
pub const DEFAULT_LOG_FILTER: &str = "pipeline_archiver=info";

/// Separator between paths in the values request surface
pub const VALUES_PATH_DELIMITER: char = ',';

/// Branch used for direct links when none is given
pub const DEFAULT_BRANCH_REF: &str = "HEAD";

/// Public GitHub API address, used when a GitHub codehost has no address
pub const GITHUB_API_ADDRESS: &str = "https://api.github.com";

/// Raw content host for direct github.com links
pub const GITHUB_RAW_ADDRESS: &str = "https://raw.githubusercontent.com";

/// Number of hex characters shown for storage URI fingerprints
pub const URI_FINGERPRINT_LEN: usize = 12;

/// Process exit codes
pub const EXIT_PERMANENT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 2;
pub const EXIT_TRANSIENT_FAILURE: u8 = 3;
