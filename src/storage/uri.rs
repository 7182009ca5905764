//! # Storage URI Decoding
//!
//! Decodes the opaque storage token into a secret-free [`StorageLocation`]
//! plus [`StorageCredentials`].
//!
//! The token is URL-safe base64 (padding optional) wrapping:
//!
//! ```text
//! s3://<accessKey>:<secretKey>@<host[:port]>/<bucket>[/<subfolder>][?region=<r>&insecure=true]
//! ```
//!
//! The decoded plaintext lives in a zeroizing buffer and is wiped once parsed.

use super::error::StoreError;
use crate::constants::URI_FINGERPRINT_LEN;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use percent_encoding::percent_decode_str;
use reqwest::Url;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroizing;

const STORAGE_SCHEME: &str = "s3";

/// Short sha256 fingerprint of a storage token, safe to log
pub fn fingerprint(token: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(token.as_bytes()));
    format!("sha256:{}", &digest[..URI_FINGERPRINT_LEN])
}

/// Where archived objects go. Contains no secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    /// `http(s)://host[:port]`
    pub endpoint: String,
    pub bucket: String,
    /// Base subfolder, may be empty
    pub subfolder: String,
    /// Region from the URI, if any
    pub region: Option<String>,
    pub insecure: bool,
}

/// Static access keys carried by the token
pub struct StorageCredentials {
    pub access_key: Zeroizing<String>,
    pub secret_key: Zeroizing<String>,
}

impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Decode and parse a storage token
pub fn decode_storage_uri(token: &str) -> Result<(StorageLocation, StorageCredentials), StoreError> {
    let fingerprint = fingerprint(token);
    let trimmed = token.trim().trim_end_matches('=');

    let bytes = Zeroizing::new(
        URL_SAFE_NO_PAD
            .decode(trimmed)
            .or_else(|_| STANDARD_NO_PAD.decode(trimmed))
            .map_err(|e| StoreError::Encoding {
                fingerprint: fingerprint.clone(),
                reason: e.to_string(),
            })?,
    );
    let plain = Zeroizing::new(
        String::from_utf8(bytes.to_vec()).map_err(|e| StoreError::Encoding {
            fingerprint: fingerprint.clone(),
            reason: e.to_string(),
        })?,
    );

    parse_plain_uri(&plain, &fingerprint)
}

fn parse_plain_uri(
    plain: &str,
    fingerprint: &str,
) -> Result<(StorageLocation, StorageCredentials), StoreError> {
    let url = Url::parse(plain).map_err(|e| StoreError::Malformed {
        fingerprint: fingerprint.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != STORAGE_SCHEME {
        return Err(StoreError::UnsupportedScheme {
            fingerprint: fingerprint.to_string(),
            scheme: url.scheme().to_string(),
        });
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| StoreError::Malformed {
            fingerprint: fingerprint.to_string(),
            reason: "missing endpoint host".to_string(),
        })?;

    let access_key = decode_component(url.username());
    let secret_key = decode_component(url.password().unwrap_or_default());
    if access_key.is_empty() || secret_key.is_empty() {
        return Err(StoreError::MissingCredentials {
            fingerprint: fingerprint.to_string(),
        });
    }

    let mut segments = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_string).collect::<Vec<_>>())
        .unwrap_or_default();
    if segments.is_empty() {
        return Err(StoreError::MissingBucket {
            fingerprint: fingerprint.to_string(),
        });
    }
    let bucket = segments.remove(0);
    let subfolder = segments.join("/");

    let mut region = None;
    let mut insecure = false;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "region" if !value.is_empty() => region = Some(value.into_owned()),
            "insecure" => insecure = matches!(value.as_ref(), "true" | "1"),
            _ => {}
        }
    }

    let scheme = if insecure { "http" } else { "https" };
    let endpoint = match url.port() {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    };

    Ok((
        StorageLocation {
            endpoint,
            bucket,
            subfolder,
            region,
            insecure,
        },
        StorageCredentials {
            access_key,
            secret_key,
        },
    ))
}

fn decode_component(raw: &str) -> Zeroizing<String> {
    Zeroizing::new(percent_decode_str(raw).decode_utf8_lossy().into_owned())
}

/// Encode a plain storage URI into a token (used by tooling and tests)
pub fn encode_storage_uri(plain: &str) -> String {
    URL_SAFE_NO_PAD.encode(plain.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_full_uri() {
        let token =
            encode_storage_uri("s3://AKIA:s3cr3t@minio.local:9000/artifacts/ci/archive?region=eu-west-1&insecure=true");
        let (location, credentials) = decode_storage_uri(&token).expect("token should decode");

        assert_eq!(location.endpoint, "http://minio.local:9000");
        assert_eq!(location.bucket, "artifacts");
        assert_eq!(location.subfolder, "ci/archive");
        assert_eq!(location.region.as_deref(), Some("eu-west-1"));
        assert!(location.insecure);
        assert_eq!(credentials.access_key.as_str(), "AKIA");
        assert_eq!(credentials.secret_key.as_str(), "s3cr3t");
    }

    #[test]
    fn test_decode_without_subfolder_defaults_to_https() {
        let token = encode_storage_uri("s3://ak:sk@s3.amazonaws.com/bucket");
        let (location, _) = decode_storage_uri(&token).expect("token should decode");
        assert_eq!(location.endpoint, "https://s3.amazonaws.com");
        assert_eq!(location.bucket, "bucket");
        assert!(location.subfolder.is_empty());
        assert!(location.region.is_none());
    }

    #[test]
    fn test_percent_encoded_credentials() {
        let token = encode_storage_uri("s3://ak:se%2Fcr%2Bet@host/bucket");
        let (_, credentials) = decode_storage_uri(&token).expect("token should decode");
        assert_eq!(credentials.secret_key.as_str(), "se/cr+et");
    }

    #[test]
    fn test_padded_standard_token_accepted() {
        use base64::engine::general_purpose::STANDARD;
        let token = STANDARD.encode("s3://ak:sk@host/bucket/sub");
        let (location, _) = decode_storage_uri(&token).expect("token should decode");
        assert_eq!(location.subfolder, "sub");
    }

    #[test]
    fn test_invalid_base64() {
        let err = decode_storage_uri("!!not base64!!").unwrap_err();
        assert!(matches!(err, StoreError::Encoding { .. }));
    }

    #[test]
    fn test_unsupported_scheme() {
        let token = encode_storage_uri("gs://ak:sk@host/bucket");
        let err = decode_storage_uri(&token).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedScheme { ref scheme, .. } if scheme == "gs"));
    }

    #[test]
    fn test_missing_bucket() {
        let token = encode_storage_uri("s3://ak:sk@host/");
        let err = decode_storage_uri(&token).unwrap_err();
        assert!(matches!(err, StoreError::MissingBucket { .. }));
    }

    #[test]
    fn test_missing_credentials() {
        let token = encode_storage_uri("s3://host/bucket");
        let err = decode_storage_uri(&token).unwrap_err();
        assert!(matches!(err, StoreError::MissingCredentials { .. }));
    }

    #[test]
    fn test_errors_never_contain_secret() {
        let token = encode_storage_uri("gs://topsecret:hunter2@host/bucket");
        let err = decode_storage_uri(&token).unwrap_err();
        let message = err.to_string();
        assert!(!message.contains("hunter2"));
        assert!(!message.contains(&token));
        assert!(message.contains("sha256:"));
    }

    #[test]
    fn test_fingerprint_is_stable_and_short() {
        let first = fingerprint("token");
        assert_eq!(first, fingerprint("token"));
        assert_ne!(first, fingerprint("other"));
        assert_eq!(first.len(), "sha256:".len() + URI_FINGERPRINT_LEN);
    }

    #[test]
    fn test_credentials_debug_redacted() {
        let token = encode_storage_uri("s3://ak:hunter2@host/bucket");
        let (_, credentials) = decode_storage_uri(&token).expect("token should decode");
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }
}
