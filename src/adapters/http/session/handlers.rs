//! HTTP handlers for session bootstrap and health.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;

use super::dto::{HealthView, SessionView};
use crate::adapters::http::cookies::session_cookie;
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::OptionalAuth;
use crate::adapters::http::AppState;

/// GET / - Create or recognise the visitor.
///
/// An anonymous visitor gets a new user and an `auth_token` cookie. A valid
/// cookie is reported back as an existing user. An invalid cookie never
/// reaches this handler; the auth middleware answers 401.
pub async fn bootstrap_session(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.session.handle(user).await?;

    let mut headers = HeaderMap::new();
    if let Some(token) = &result.token {
        if let Some(cookie) = session_cookie(&token.token, state.cookie) {
            headers.insert(SET_COOKIE, cookie);
        }
    }

    let body = SessionView {
        user_id: result.user_id.to_string(),
        message: result.status.message().to_string(),
    };
    Ok((headers, Json(body)))
}

/// GET /health - Liveness probe.
pub async fn health() -> Json<HealthView> {
    Json(HealthView {
        health: "ok".to_string(),
    })
}
