//! Object Store Mock Server
//!
//! Serves the in-memory S3-compatible store for local development.
//!
//! Environment Variables:
//! - PORT: Port to listen on (default: 9000)
//! - MOCK_BUCKETS: Comma-separated buckets to create (default: artifacts)

use mock_server::object_store::ObjectStoreMock;
use mock_server::port_from_env;
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_server=info,tower_http=info".into()),
        )
        .init();

    let port = port_from_env(9000)?;
    let buckets = std::env::var("MOCK_BUCKETS").unwrap_or_else(|_| "artifacts".to_string());

    let mut store = ObjectStoreMock::new();
    for bucket in buckets.split(',').map(str::trim).filter(|b| !b.is_empty()) {
        info!("Creating bucket {}", bucket);
        store = store.with_bucket(bucket);
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("✅ Object store mock ready at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, store.router()).await?;
    Ok(())
}
