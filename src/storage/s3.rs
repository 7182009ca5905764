//! # S3-Compatible Store
//!
//! Uploads archived artifacts to any S3-compatible endpoint (AWS S3, MinIO,
//! Ceph RGW, ...) using path-style addressing and static credentials taken
//! from the storage token.

use super::error::{StoreError, UploadError};
use super::uri::{decode_storage_uri, StorageCredentials, StorageLocation};
use super::{RemoteStore, StoreFactory};
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, RequestChecksumCalculation};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, field, info_span, Instrument};

const CREDENTIALS_PROVIDER_NAME: &str = "storage-uri";

/// Builds [`S3Store`]s from storage tokens
#[derive(Debug, Clone)]
pub struct S3StoreFactory {
    default_region: String,
}

impl S3StoreFactory {
    pub fn new(default_region: impl Into<String>) -> Self {
        Self {
            default_region: default_region.into(),
        }
    }
}

impl StoreFactory for S3StoreFactory {
    fn from_encrypted_uri(&self, uri: &str) -> Result<Box<dyn RemoteStore>, StoreError> {
        let (location, credentials) = decode_storage_uri(uri)?;
        debug!(
            "Decoded storage location: endpoint={}, bucket={}, subfolder='{}'",
            location.endpoint, location.bucket, location.subfolder
        );
        Ok(Box::new(S3Store::new(
            location,
            &credentials,
            &self.default_region,
        )))
    }
}

/// S3-compatible object store bound to one bucket
pub struct S3Store {
    client: S3Client,
    location: StorageLocation,
    region: String,
    subfolder: String,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("location", &self.location)
            .field("region", &self.region)
            .field("subfolder", &self.subfolder)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    /// Create a store for a decoded location
    pub fn new(location: StorageLocation, credentials: &StorageCredentials, default_region: &str) -> Self {
        let region = location
            .region
            .clone()
            .unwrap_or_else(|| default_region.to_string());

        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .credentials_provider(Credentials::new(
                credentials.access_key.as_str(),
                credentials.secret_key.as_str(),
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ))
            .endpoint_url(&location.endpoint)
            .force_path_style(true)
            // Plain bodies keep uploads compatible with non-AWS S3 implementations
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        let subfolder = location.subfolder.clone();
        Self {
            client: S3Client::from_conf(config),
            location,
            region,
            subfolder,
        }
    }

    pub fn location(&self) -> &StorageLocation {
        &self.location
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl RemoteStore for S3Store {
    fn subfolder(&self) -> &str {
        &self.subfolder
    }

    fn set_subfolder(&mut self, subfolder: String) {
        self.subfolder = subfolder;
    }

    async fn upload(&self, local_path: &Path, object_name: &str) -> Result<String, UploadError> {
        let key = paths::join_object_key(&self.subfolder, object_name);
        let span = info_span!(
            "store.upload",
            store.bucket = %self.location.bucket,
            object.key = %key,
            local.path = %local_path.display(),
            operation.duration_ms = field::Empty,
            operation.success = field::Empty,
            error.status_code = field::Empty,
        );
        let span_clone = span.clone();
        let start = Instant::now();

        let result = async {
            let metadata = tokio::fs::metadata(local_path)
                .await
                .map_err(|source| UploadError::LocalFile {
                    path: local_path.to_path_buf(),
                    source,
                })?;
            if !metadata.is_file() {
                return Err(UploadError::LocalFile {
                    path: local_path.to_path_buf(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "not a regular file",
                    ),
                });
            }

            let body = ByteStream::from_path(local_path)
                .await
                .map_err(|e| UploadError::LocalFile {
                    path: local_path.to_path_buf(),
                    source: std::io::Error::other(e.to_string()),
                })?;

            self.client
                .put_object()
                .bucket(&self.location.bucket)
                .key(&key)
                .body(body)
                .send()
                .await
                .map_err(|e| UploadError::Remote {
                    key: key.clone(),
                    status: e.raw_response().map(|r| r.status().as_u16()),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            debug!("Uploaded {} bytes to {}", metadata.len(), key);
            Ok(())
        }
        .instrument(span)
        .await;

        span_clone.record("operation.duration_ms", start.elapsed().as_millis() as u64);
        match result {
            Ok(()) => {
                span_clone.record("operation.success", true);
                Ok(key)
            }
            Err(e) => {
                span_clone.record("operation.success", false);
                if let UploadError::Remote {
                    status: Some(code), ..
                } = &e
                {
                    span_clone.record("error.status_code", *code);
                }
                Err(e)
            }
        }
    }
}
