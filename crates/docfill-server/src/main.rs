//! docfill-server: fill `.docx` templates over HTTP.
//!
//! Configuration is read from `config.toml` in the platform config directory
//! (or `DOCFILL_CONFIG`), API keys from `secret.json` next to it, and both
//! can be overridden from the environment (`PORT`, `ALLOWED_ORIGINS`,
//! `DOCFILL_ORACLE`, `GEMINI_API_KEY`, `OPENAI_API_KEY`, ...).

use anyhow::{Context, Result};
use docfill_infrastructure::ConfigService;
use docfill_server::{DEFAULT_LOG_FILTER, build_router, build_state};
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = ConfigService::new()
        .load()
        .context("failed to load configuration")?;
    let state = build_state(&config);
    let app = build_router(state, &config.app.server);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.app.server.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    tracing::info!(%addr, "docfill-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("docfill-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
