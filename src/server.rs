//! HTTP server lifecycle.
//!
//! Binds the listener, serves the API with request tracing, and stops
//! gracefully when the cancellation token fires.

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::error::AppError;

/// The API router with request tracing.
pub fn app(state: AppState) -> Router {
    api::router(state).layer(TraceLayer::new_for_http())
}

/// Bind a TCP listener on `addr` (`host:port`).
pub async fn bind(addr: &str) -> Result<TcpListener, AppError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))
}

/// Serve until `shutdown` is cancelled, then drain in-flight requests.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::internal(format!("Listener has no local address: {}", e)))?;

    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    log::info!("Server stopped");
    Ok(())
}
