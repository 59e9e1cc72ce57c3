//! Axum routes for session endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{bootstrap_session, health};
use crate::adapters::http::AppState;

/// Creates routes for session endpoints.
///
/// - GET / - Bootstrap the visitor's session
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/", get(bootstrap_session))
}

/// Creates the liveness route. Mounted outside the session middleware so a
/// stale cookie never fails it.
///
/// - GET /health - Liveness probe
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
