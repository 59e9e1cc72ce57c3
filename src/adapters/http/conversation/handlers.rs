//! HTTP handler for `POST /query`.

use axum::body::Body;
use axum::extract::State;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::dto::QueryRequest;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::application::handlers::{QueryError, SubmitQueryCommand};
use crate::domain::foundation::{DocumentId, ErrorCode, ThreadId};

pub const THREAD_ID_HEADER: HeaderName = HeaderName::from_static("x-thread-id");
pub const THREAD_CREATED_HEADER: HeaderName = HeaderName::from_static("x-thread-created");
const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /query - Stream the assistant's reply to one turn.
///
/// Headers are committed before the first fragment. A model failure ends
/// the body without its terminating chunk.
///
/// # Errors
/// - 401 Unauthorized: No session, or `X-Thread-Id` is not the caller's
/// - 409 Conflict: A reply is already streaming on this thread
/// - 422 Unprocessable Entity: No usable document for the turn
pub async fn submit_query(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    headers: HeaderMap,
    Json(body): Json<QueryRequest>,
) -> Result<Response, ApiError> {
    let thread_id = thread_id_from(&headers)?;
    let trace_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let cmd = SubmitQueryCommand {
        user_id: user.id,
        thread_id,
        pdf_id: body.pdf_id.map(DocumentId::new),
        turns: body.messages.into_iter().map(Into::into).collect(),
        trace_id,
    };
    let result = state.query.handle(cmd).await?;

    let mut response_headers = HeaderMap::new();
    response_headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    response_headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response_headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    let thread_header = HeaderValue::from_str(result.thread_id.as_str())
        .map_err(|e| ApiError::internal(ErrorCode::InternalError, e))?;
    response_headers.insert(THREAD_ID_HEADER, thread_header);
    if result.created {
        response_headers.insert(THREAD_CREATED_HEADER, HeaderValue::from_static("true"));
    }

    Ok((
        StatusCode::OK,
        response_headers,
        Body::from_stream(result.fragments),
    )
        .into_response())
}

fn thread_id_from(headers: &HeaderMap) -> Result<Option<ThreadId>, ApiError> {
    let Some(raw) = headers.get(&THREAD_ID_HEADER) else {
        return Ok(None);
    };
    let parsed = raw
        .to_str()
        .ok()
        .and_then(|s| s.parse::<ThreadId>().ok())
        .ok_or(QueryError::ThreadNotFound)?;
    Ok(Some(parsed))
}
