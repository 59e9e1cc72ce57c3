//! HTTP handlers for thread endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;

use super::dto::{MessagePageView, PaginationParams, ThreadView};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::application::handlers::ThreadQueryError;
use crate::domain::foundation::ThreadId;

/// GET /threads - The caller's threads, newest first.
pub async fn list_threads(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<ThreadView>>, ApiError> {
    let threads = state.threads.list(&user.id).await?;
    Ok(Json(threads.iter().map(ThreadView::from).collect()))
}

/// GET /threads/:thread_id/messages - Stored history of one thread.
///
/// # Errors
/// - 401 Unauthorized: Unknown thread, or a thread the caller does not own
pub async fn list_messages(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(thread_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<MessagePageView>, ApiError> {
    let thread_id: ThreadId = thread_id
        .parse()
        .map_err(|_| ApiError::from(ThreadQueryError::ThreadNotFound))?;
    let (offset, limit) = (params.offset(), params.limit());

    let page = state
        .threads
        .messages(&user.id, &thread_id, offset, limit)
        .await?;

    Ok(Json(MessagePageView::new(thread_id.to_string(), &page, offset, limit)))
}
