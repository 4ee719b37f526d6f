//! Scribe Server entry point.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;

use scribe_core::Config;
use scribe_server::{app, logging, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading any ${ENV_VAR} config references
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: failed to load config: {e}\n  Using default configuration.");
            Config::default()
        }
    };
    logging::init_from_config(&config);

    tracing::info!("Starting scribe-server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(provider = %config.llm.provider, "LLM provider configured");
    tracing::info!(model_dir = ?config.ocr.resolved_model_dir(), "OCR model directory");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid server address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let state = AppState::new(config)
        .await
        .context("failed to assemble workflow")?;
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("scribe-server listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
