//! OCR Gateway Server
//!
//! Accepts image uploads, tracks queue position over server-sent events, and
//! throttles OCR processing behind a fixed-capacity concurrency limiter.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocr_gateway::admission::Reaper;
use ocr_gateway::config::Config;
use ocr_gateway::ocr::OcrsDetector;
use ocr_gateway::routes;
use ocr_gateway::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting OCR Gateway v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("OCR concurrency: {}", config.queue.concurrency);
    tracing::info!(
        "Max upload size: {} bytes",
        config.server.max_upload_bytes
    );

    // Load the OCR engine at startup, before accepting any requests
    let detector = OcrsDetector::load(config.ocr.models_dir.as_deref())
        .expect("Failed to load OCR models");

    let host = config.server.host.clone();
    let port = config.server.port;
    let state = AppState::new(config, Arc::new(detector));

    // Spawn the reaper with an explicit shutdown hook
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let reaper_handle = if state.config().queue.reaper_enabled {
        let reaper = Reaper::new(
            state.store().clone(),
            state.queue().clone(),
            state.notifiers().clone(),
            state.config().queue.reaper_interval,
            state.config().queue.reaper_grace,
        );
        Some(reaper.spawn(shutdown_rx))
    } else {
        tracing::info!("Reaper disabled; abandoned requests are kept until restart");
        None
    };

    let app = routes::router(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Invalid listen address");
    tracing::info!("OCR Gateway listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    // Stop the reaper before exiting
    let _ = shutdown_tx.send(true);
    if let Some(handle) = reaper_handle {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
}

/// Graceful shutdown signal handler
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
