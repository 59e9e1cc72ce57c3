//! Axum routes for thread endpoints.

use axum::routing::get;
use axum::Router;

use super::handlers::{list_messages, list_threads};
use crate::adapters::http::AppState;

/// - GET /threads - List the caller's threads
/// - GET /threads/:thread_id/messages - Paged history of one thread
pub fn thread_routes() -> Router<AppState> {
    Router::new()
        .route("/threads", get(list_threads))
        .route("/threads/:thread_id/messages", get(list_messages))
}
