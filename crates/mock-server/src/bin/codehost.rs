//! Codehost Mock Server
//!
//! Serves GitHub, GitLab and Gitea raw-file endpoints plus direct raw links.
//!
//! Environment Variables:
//! - PORT: Port to listen on (default: 8081)
//! - MOCK_CODEHOST_TOKEN: Token required on API routes (default: none)
//! - MOCK_CODEHOST_ROOT: Directory laid out as `{owner}/{repo}/{ref}/{path}`

use mock_server::codehost::CodehostMock;
use mock_server::port_from_env;
use std::net::SocketAddr;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_server=info,tower_http=info".into()),
        )
        .init();

    let port = port_from_env(8081)?;

    let mut mock = CodehostMock::new();
    if let Ok(token) = std::env::var("MOCK_CODEHOST_TOKEN") {
        mock = mock.with_token(&token);
    }
    match std::env::var("MOCK_CODEHOST_ROOT") {
        Ok(root) => {
            info!("Loading files from {}", root);
            mock = mock.load_dir(std::path::Path::new(&root))?;
        }
        Err(_) => warn!("⚠️  MOCK_CODEHOST_ROOT not set, serving no files"),
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("✅ Codehost mock ready at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, mock.router()).await?;
    Ok(())
}
