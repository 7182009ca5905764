//! # Storage Error Types
//!
//! Store construction and upload errors, classified as transient or permanent.

use std::path::PathBuf;
use thiserror::Error;

/// The storage token could not be turned into a store
///
/// Only the token fingerprint is carried; never the token itself.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage URI {fingerprint} could not be decoded: {reason}")]
    Encoding { fingerprint: String, reason: String },
    #[error("storage URI {fingerprint} is malformed: {reason}")]
    Malformed { fingerprint: String, reason: String },
    #[error("storage URI {fingerprint} uses unsupported scheme '{scheme}'")]
    UnsupportedScheme { fingerprint: String, scheme: String },
    #[error("storage URI {fingerprint} does not name a bucket")]
    MissingBucket { fingerprint: String },
    #[error("storage URI {fingerprint} does not carry access credentials")]
    MissingCredentials { fingerprint: String },
}

impl StoreError {
    /// A bad token stays bad; nothing here is worth retrying
    pub fn is_transient(&self) -> bool {
        false
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            StoreError::Encoding { .. } => {
                "The storage URI is not a valid encoded token. Re-issue it from the storage integration settings.".to_string()
            }
            StoreError::Malformed { .. } => {
                "The decoded storage URI is not a valid URI. Expected s3://<accessKey>:<secretKey>@<host>/<bucket>[/<subfolder>].".to_string()
            }
            StoreError::UnsupportedScheme { .. } => {
                "Only S3-compatible storage (s3://) is supported.".to_string()
            }
            StoreError::MissingBucket { .. } => {
                "Add the bucket as the first path segment of the storage URI.".to_string()
            }
            StoreError::MissingCredentials { .. } => {
                "Add an access key and secret key to the storage URI.".to_string()
            }
        }
    }
}

/// An upload did not complete
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("local file {} cannot be read: {source}", .path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload of {key} failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Remote {
        key: String,
        status: Option<u16>,
        message: String,
    },
}

impl UploadError {
    /// Network failures, throttling and server errors may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        match self {
            UploadError::LocalFile { .. } => false,
            UploadError::Remote { status: None, .. } => true,
            UploadError::Remote {
                status: Some(code), ..
            } => *code == 429 || *code >= 500,
        }
    }

    /// Get remediation guidance for this error
    pub fn remediation(&self) -> String {
        match self {
            UploadError::LocalFile { .. } => {
                "Verify the step produced the artifact at the configured location.".to_string()
            }
            UploadError::Remote {
                status: Some(401 | 403),
                ..
            } => "The object store rejected the credentials. Check the access key, secret key and bucket policy.".to_string(),
            UploadError::Remote {
                status: Some(404), ..
            } => "The bucket does not exist on the configured endpoint.".to_string(),
            UploadError::Remote { .. } if self.is_transient() => {
                "The object store is unreachable or overloaded. Re-run the step later.".to_string()
            }
            UploadError::Remote { .. } => {
                "The object store rejected the upload. Check the error message for details.".to_string()
            }
        }
    }
}
