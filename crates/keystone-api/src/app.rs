//! Application builder: wires router, middleware, and state into an Axum app
//! and runs it until a shutdown signal arrives.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tracing::{error, info, warn};

use keystone_core::config::AppConfig;
use keystone_core::error::{AppError, ErrorKind};
use keystone_database::provider::AccountStore;
use keystone_service::notification;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the Keystone server with the given configuration.
///
/// Opens the account store, starts notification delivery, and serves HTTP
/// until Ctrl+C or SIGTERM. Queued notices get `shutdown_grace_seconds` to
/// drain after the listener closes.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Keystone server...");

    // ── Step 1: Open the account store ───────────────────────────
    let store = AccountStore::open(&config.database).await?;

    // ── Step 2: Shutdown channel & notification worker ───────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (dispatcher, worker_handle) = notification::start(&config.notification, shutdown_rx)?;

    // ── Step 3: Build state and router ───────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, store, dispatcher)?;
    let app = build_app(state.clone());

    // ── Step 4: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
        })?;

    info!(addr = %addr, "Keystone server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    // ── Step 5: Drain background work ────────────────────────────
    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker_handle {
        match tokio::time::timeout(grace, handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(error = %e, "Notification worker panicked"),
            Err(_) => warn!(
                grace_seconds = grace.as_secs(),
                "Notification worker did not finish within the grace period"
            ),
        }
    }

    state.store.close().await;
    info!("Keystone server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
