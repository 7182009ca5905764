//! HTTP source fetcher against the codehost mock

use super::common::{registry, TOKEN};
use axum::http::StatusCode;
use mock_server::codehost::CodehostMock;
use pipeline_archiver::model::{ValuesRequest, ValuesSource};
use pipeline_archiver::source::{FetchError, HttpSourceFetcher, SourceFetcher};
use pipeline_archiver::values::{AggregateError, ValuesAggregator};
use std::net::SocketAddr;

async fn start(mock: &CodehostMock) -> (HttpSourceFetcher, SocketAddr) {
    let addr = mock_server::spawn(mock.router())
        .await
        .expect("mock server should bind");
    let fetcher = HttpSourceFetcher::new(registry(addr), "pipeline-archiver-tests")
        .expect("client should build")
        .with_github_raw_address(format!("http://{addr}"));
    (fetcher, addr)
}

fn via_codehost(codehost_id: u64, branch: &str, path: &str) -> ValuesSource {
    ValuesSource {
        codehost_id,
        owner: "acme".to_string(),
        repo: "charts".to_string(),
        branch: branch.to_string(),
        path: path.to_string(),
        repo_link: None,
    }
}

fn via_link(link: &str, branch: &str, path: &str) -> ValuesSource {
    ValuesSource {
        branch: branch.to_string(),
        path: path.to_string(),
        repo_link: Some(link.to_string()),
        ..ValuesSource::default()
    }
}

#[tokio::test]
async fn test_download_from_each_codehost_kind() {
    let mock = CodehostMock::new()
        .with_token(TOKEN)
        .with_file("acme/charts", "main", "deploy/values.yaml", "replicas: 2\n");
    let (fetcher, _) = start(&mock).await;

    for codehost_id in [1, 2, 3] {
        let body = fetcher
            .download(&via_codehost(codehost_id, "main", "deploy/values.yaml"))
            .await
            .unwrap_or_else(|e| panic!("codehost {codehost_id} download failed: {e}"));
        assert_eq!(body, b"replicas: 2\n");
    }
    assert_eq!(
        mock.requested_paths(),
        vec!["deploy/values.yaml", "deploy/values.yaml", "deploy/values.yaml"]
    );
}

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let mock = CodehostMock::new()
        .with_token(TOKEN)
        .with_file("acme/charts", "main", "values.yaml", "a: 1\n");
    let (fetcher, _) = start(&mock).await;

    let err = fetcher
        .download(&via_codehost(4, "main", "values.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 401, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_empty_branch_uses_default_branch() {
    let mock = CodehostMock::new().with_file("acme/charts", "main", "values.yaml", "a: 1\n");
    let (fetcher, _) = start(&mock).await;

    let body = fetcher
        .download(&via_codehost(1, "", "values.yaml"))
        .await
        .expect("download should succeed");
    assert_eq!(body, b"a: 1\n");
}

#[tokio::test]
async fn test_missing_file_is_a_status_error() {
    let mock = CodehostMock::new();
    let (fetcher, _) = start(&mock).await;

    let err = fetcher
        .download(&via_codehost(2, "main", "nope.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, ref path } if path == "nope.yaml"));
}

#[tokio::test]
async fn test_unknown_codehost_makes_no_request() {
    let mock = CodehostMock::new();
    let (fetcher, _) = start(&mock).await;

    let err = fetcher
        .download(&via_codehost(99, "main", "values.yaml"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::UnknownCodehost { codehost_id: 99, .. }));
    assert!(mock.requested_paths().is_empty());
}

#[tokio::test]
async fn test_direct_links() {
    let mock = CodehostMock::new()
        .with_file("acme/charts", "main", "values.yaml", "from: github\n")
        .with_file("group/charts", "release", "env/prod.yaml", "from: gitlab\n");
    let (fetcher, addr) = start(&mock).await;

    let github = fetcher
        .download(&via_link("https://github.com/acme/charts.git", "", "values.yaml"))
        .await
        .expect("github link should resolve");
    assert_eq!(github, b"from: github\n");

    let gitlab = fetcher
        .download(&via_link(
            &format!("http://{addr}/group/charts"),
            "release",
            "env/prod.yaml",
        ))
        .await
        .expect("raw link should resolve");
    assert_eq!(gitlab, b"from: gitlab\n");
}

#[tokio::test]
async fn test_aggregate_end_to_end() {
    let mock = CodehostMock::new()
        .with_token(TOKEN)
        .with_file("acme/charts", "main", "base.yaml", "image:\n  tag: '1.0'\nreplicas: 1\n")
        .with_file("acme/charts", "main", "empty.yaml", "")
        .with_file("acme/charts", "main", "prod.yaml", "image:\n  tag: '2.0'\n");
    let (fetcher, _) = start(&mock).await;
    let aggregator = ValuesAggregator::new(fetcher);

    let request = ValuesRequest {
        codehost_id: 2,
        owner: "acme".to_string(),
        repo: "charts".to_string(),
        branch: "main".to_string(),
        repo_link: None,
        values_paths: "base.yaml,empty.yaml,prod.yaml".to_string(),
    };
    let merged = aggregator
        .aggregate_request(request)
        .await
        .expect("aggregation should succeed");

    let value: serde_yaml::Value = serde_yaml::from_str(merged.as_str()).expect("output is YAML");
    let expected: serde_yaml::Value =
        serde_yaml::from_str("{image: {tag: '2.0'}, replicas: 1}").expect("expected YAML");
    assert_eq!(value, expected);
}

#[tokio::test]
async fn test_aggregate_stops_at_first_failure() {
    let mock = CodehostMock::new()
        .with_file("acme/charts", "main", "a.yaml", "a: 1\n")
        .with_file("acme/charts", "main", "c.yaml", "c: 1\n");
    mock.fail_path("b.yaml", StatusCode::BAD_GATEWAY);
    let (fetcher, _) = start(&mock).await;
    let aggregator = ValuesAggregator::new(fetcher);

    let sources = ["a.yaml", "b.yaml", "c.yaml"].map(|p| via_codehost(3, "main", p));
    let err = aggregator.aggregate(&sources).await.unwrap_err();

    assert!(matches!(
        err,
        AggregateError::Fetch { ref path, source: FetchError::Status { status: 502, .. } } if path == "b.yaml"
    ));
    assert!(err.is_transient());
    assert_eq!(mock.requested_paths(), vec!["a.yaml", "b.yaml"]);
}
