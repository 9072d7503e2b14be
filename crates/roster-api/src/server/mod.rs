//! Server assembly and runner

use std::net::SocketAddr;

use axum::Router;
use roster_common::AppError;
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::apply_middleware;
use crate::routes::{api_routes, health_routes};
use crate::state::AppState;

/// Build the complete Axum application. Liveness routes sit outside the
/// rate-limited stack so probes never get throttled.
pub fn create_app(state: AppState) -> Router {
    let config = state.config().clone();
    let api = apply_middleware(
        api_routes(),
        &config.rate_limit,
        &config.cors,
        config.app.env.is_production(),
    );

    health_routes().merge(api).with_state(state)
}

/// Bind and run the HTTP server until the process exits
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), AppError> {
    let app = create_app(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Read API listening on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}
