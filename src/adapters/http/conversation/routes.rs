//! Axum routes for the conversation endpoint.

use axum::routing::post;
use axum::Router;

use super::handlers::submit_query;
use crate::adapters::http::AppState;

/// - POST /query - Submit a turn and stream the reply
pub fn conversation_routes() -> Router<AppState> {
    Router::new().route("/query", post(submit_query))
}
