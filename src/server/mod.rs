//! HTTP dashboard server.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;

use anyhow::{Context, Result};
use tracing::info;

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(host: &str, port: u16, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Dashboard listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
