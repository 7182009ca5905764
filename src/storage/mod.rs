//! # Remote Storage
//!
//! Object store capability used by the archiver.
//!
//! A [`StoreFactory`] turns the opaque storage token into a [`RemoteStore`]
//! once, at the boundary. After that the archiver only sees the structured
//! store; the raw token is not kept in its working data.
//!
//! Stores are built fresh per archive call and share no mutable state.

mod error;
mod s3;
mod uri;

pub use error::{StoreError, UploadError};
pub use s3::{S3Store, S3StoreFactory};
pub use uri::{decode_storage_uri, encode_storage_uri, fingerprint, StorageCredentials, StorageLocation};

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// Upload capability for one storage destination
#[async_trait]
pub trait RemoteStore: Send + Sync + fmt::Debug {
    /// Current subfolder objects are uploaded under (may be empty)
    fn subfolder(&self) -> &str;

    /// Replace the subfolder before uploading
    fn set_subfolder(&mut self, subfolder: String);

    /// Upload a local file as `subfolder/object_name`
    ///
    /// Returns the full object key that was written.
    async fn upload(&self, local_path: &Path, object_name: &str) -> Result<String, UploadError>;
}

/// Builds stores from storage tokens
pub trait StoreFactory: Send + Sync {
    /// Decode the token and construct a store
    fn from_encrypted_uri(&self, uri: &str) -> Result<Box<dyn RemoteStore>, StoreError>;
}
