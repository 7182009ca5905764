//! Shared setup for mock server tests

use pipeline_archiver::config::CodehostRegistry;
use std::net::SocketAddr;
use std::path::Path;

pub const BUCKET: &str = "artifacts";
pub const TOKEN: &str = "secret";

/// Storage token for a bucket on the local object store mock
pub fn storage_token(addr: SocketAddr, subfolder: &str) -> String {
    let path = if subfolder.is_empty() {
        BUCKET.to_string()
    } else {
        format!("{BUCKET}/{subfolder}")
    };
    pipeline_archiver::storage::encode_storage_uri(&format!(
        "s3://ak:sk@127.0.0.1:{}/{path}?insecure=true",
        addr.port()
    ))
}

/// Registry with one codehost of each kind, all served by `addr`
///
/// Ids: 1 = github, 2 = gitlab, 3 = gitea, 4 = gitea without a token.
pub fn registry(addr: SocketAddr) -> CodehostRegistry {
    let yaml = format!(
        r"
codehosts:
  - id: 1
    type: github
    address: http://{addr}
    accessToken: {TOKEN}
  - id: 2
    type: gitlab
    address: http://{addr}
    accessToken: {TOKEN}
  - id: 3
    type: gitea
    address: http://{addr}/
    accessToken: {TOKEN}
  - id: 4
    type: gitea
    address: http://{addr}
"
    );
    CodehostRegistry::from_yaml(Path::new("codehosts.yaml"), &yaml).expect("registry should parse")
}
