//! S3 store against the object store mock

use super::common::{storage_token, BUCKET};
use axum::http::StatusCode;
use mock_server::object_store::ObjectStoreMock;
use pipeline_archiver::archive::{ArchiveError, ArchiveOutcome, Archiver};
use pipeline_archiver::model::{ArchivalContext, FileArchive, TestArchive};
use pipeline_archiver::runtime::initialization::install_crypto_provider;
use pipeline_archiver::storage::{RemoteStore, S3StoreFactory, StoreFactory, UploadError};
use std::path::Path;

async fn start() -> (ObjectStoreMock, std::net::SocketAddr) {
    install_crypto_provider();
    let mock = ObjectStoreMock::new().with_bucket(BUCKET);
    let addr = mock_server::spawn(mock.router())
        .await
        .expect("mock server should bind");
    (mock, addr)
}

fn workspace_with(file: &str, content: &[u8]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("dist")).expect("mkdir");
    std::fs::write(dir.path().join("dist").join(file), content).expect("write");
    dir
}

#[tokio::test]
async fn test_file_archive_lands_under_composed_key() {
    let (mock, addr) = start().await;
    let workspace = workspace_with("app.zip", b"zip bytes");
    let archiver = Archiver::new(workspace.path(), S3StoreFactory::new("us-east-1"));

    let ctx = ArchivalContext::new("ci-1", 42)
        .with_storage_uri(storage_token(addr, ""))
        .with_file_archive(FileArchive::new("dist", "app.zip"));
    let outcome = archiver.archive(&ctx).await.expect("upload should succeed");

    assert!(matches!(
        outcome,
        ArchiveOutcome::Uploaded { ref key, .. } if key == "ci-1/42/file/app.zip"
    ));
    assert_eq!(mock.keys(BUCKET), vec!["ci-1/42/file/app.zip"]);
    assert!(mock.object(BUCKET, "ci-1/42/file/app.zip").is_some());
}

#[tokio::test]
async fn test_uri_subfolder_prefixes_the_key() {
    let (mock, addr) = start().await;
    let results = tempfile::tempdir().expect("tempdir");
    std::fs::write(results.path().join("junit.xml"), "<testsuites/>").expect("write");
    let archiver = Archiver::new("/unused", S3StoreFactory::new("us-east-1"));

    let ctx = ArchivalContext::new("nightly", 7)
        .with_storage_uri(storage_token(addr, "team/ci"))
        .with_test_archive(TestArchive::new(results.path(), "junit.xml"));
    archiver.archive(&ctx).await.expect("upload should succeed");

    assert_eq!(mock.keys(BUCKET), vec!["team/ci/nightly/7/test/junit.xml"]);
}

#[tokio::test]
async fn test_missing_test_output_sends_nothing() {
    let (mock, addr) = start().await;
    let results = tempfile::tempdir().expect("tempdir");
    let archiver = Archiver::new("/unused", S3StoreFactory::new("us-east-1"));

    let ctx = ArchivalContext::new("ci-1", 42)
        .with_storage_uri(storage_token(addr, ""))
        .with_test_archive(TestArchive::new(results.path(), "junit.xml"));
    let outcome = archiver.archive(&ctx).await.expect("skip is success");

    assert!(matches!(outcome, ArchiveOutcome::Skipped { .. }));
    assert_eq!(mock.put_attempts(), 0);
}

#[tokio::test]
async fn test_missing_local_file_fails_before_the_request() {
    let (mock, addr) = start().await;
    let workspace = tempfile::tempdir().expect("tempdir");
    let archiver = Archiver::new(workspace.path(), S3StoreFactory::new("us-east-1"));

    let ctx = ArchivalContext::new("ci-1", 42)
        .with_storage_uri(storage_token(addr, ""))
        .with_file_archive(FileArchive::new("dist", "app.zip"));
    let err = archiver.archive(&ctx).await.unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::Upload { source: UploadError::LocalFile { .. }, .. }
    ));
    assert_eq!(mock.put_attempts(), 0);
}

#[tokio::test]
async fn test_unavailable_store_is_transient() {
    let (mock, addr) = start().await;
    mock.fail_puts_with(StatusCode::SERVICE_UNAVAILABLE);
    let workspace = workspace_with("app.zip", b"zip bytes");
    let archiver = Archiver::new(workspace.path(), S3StoreFactory::new("us-east-1"));

    let ctx = ArchivalContext::new("ci-1", 42)
        .with_storage_uri(storage_token(addr, ""))
        .with_file_archive(FileArchive::new("dist", "app.zip"));
    let err = archiver.archive(&ctx).await.unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::Upload { source: UploadError::Remote { status: Some(503), .. }, .. }
    ));
    assert!(err.is_transient());
    assert!(mock.keys(BUCKET).is_empty());
}

#[tokio::test]
async fn test_missing_bucket_is_permanent() {
    install_crypto_provider();
    let mock = ObjectStoreMock::new();
    let addr = mock_server::spawn(mock.router())
        .await
        .expect("mock server should bind");
    let workspace = workspace_with("app.zip", b"zip bytes");

    let store = S3StoreFactory::new("us-east-1")
        .from_encrypted_uri(&storage_token(addr, ""))
        .expect("token should decode");
    let err = store
        .upload(&workspace.path().join("dist/app.zip"), "app.zip")
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Remote { status: Some(404), .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_undecodable_token_is_a_store_error() {
    let archiver = Archiver::new(Path::new("/unused"), S3StoreFactory::new("us-east-1"));
    let ctx = ArchivalContext::new("ci-1", 42)
        .with_storage_uri("%%% not base64 %%%")
        .with_file_archive(FileArchive::new("dist", "app.zip"));

    let err = archiver.archive(&ctx).await.unwrap_err();
    assert!(matches!(err, ArchiveError::Store { .. }));
    assert!(!err.to_string().contains("not base64"));
}
