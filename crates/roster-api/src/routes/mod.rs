//! Route definitions

use axum::{routing::get, Router};

use crate::handlers::{health, sponsors};
use crate::state::AppState;

/// The rate-limited API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().route(
        "/api/vrchat/sponsors/:guild_id",
        get(sponsors::get_guild_sponsors),
    )
}

/// Liveness routes, exported separately so they bypass rate limiting
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/ping", get(health::ping))
        .route("/health", get(health::health_check))
}
