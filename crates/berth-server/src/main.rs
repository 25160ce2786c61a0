//! Berth server entry point.
//!
//! Initialises tracing, loads configuration from environment variables,
//! connects to the Docker daemon socket and serves the REST API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use berth_server::{BollardDaemon, RuntimeDaemon, ServerConfig, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialise tracing with RUST_LOG env filter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("berth-server starting");

    // 2. Load configuration from PORT / BIND_ADDR / DOCKER_SOCKET.
    let config = ServerConfig::from_env()?;

    tracing::info!(
        listen_addr   = %config.listen_addr(),
        docker_socket = %config.docker_socket,
        "configuration loaded",
    );

    // 3. Connect to the daemon and verify the socket answers.
    let daemon = BollardDaemon::connect(&config.docker_socket)
        .with_context(|| format!("failed to open Docker socket {}", config.docker_socket))?;
    daemon
        .ping()
        .await
        .context("Docker daemon ping failed, is the daemon running?")?;
    tracing::info!("Docker daemon reachable");

    let router = create_router(Arc::new(daemon));

    // 4. Bind and serve.
    let listener = tokio::net::TcpListener::bind(config.listen_addr())
        .await
        .context("failed to bind TCP listener")?;

    tracing::info!("Server is running on http://{}", config.listen_addr());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("berth-server shut down");
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) for graceful shutdown.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
