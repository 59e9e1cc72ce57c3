//! HTTP error responses.
//!
//! Every handler error funnels through `ApiError`, which renders
//! `{"code": "...", "message": "..."}` with the matching status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    DocumentQueryError, QueryError, SessionError, ThreadQueryError, UploadError,
};
use crate::domain::foundation::{AuthError, ErrorCode};

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code, message),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed, message)
    }

    /// Logs `detail` and returns a generic 500.
    pub fn internal(code: ErrorCode, detail: impl std::fmt::Display) -> Self {
        tracing::error!(code = %code, error = %detail, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, "Internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::unauthorized(err.to_string()),
            AuthError::IssuanceFailed(_) => ApiError::internal(ErrorCode::InternalError, err),
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::ThreadNotFound => {
                ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::ThreadNotFound, err.to_string())
            }
            QueryError::ContextMissing(_) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::ContextMissing,
                err.to_string(),
            ),
            QueryError::TurnInProgress => {
                ApiError::new(StatusCode::CONFLICT, ErrorCode::TurnInProgress, err.to_string())
            }
            QueryError::Persistence(_) => ApiError::internal(ErrorCode::DatabaseError, err),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Token(e) => e.into(),
            SessionError::Persistence(e) => ApiError::internal(ErrorCode::DatabaseError, e),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NotPdf => {
                ApiError::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidFileType, err.to_string())
            }
            UploadError::TooLarge { .. } => {
                ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, ErrorCode::PayloadTooLarge, err.to_string())
            }
            UploadError::Extraction(ref detail) => {
                tracing::warn!(error = %detail, "PDF extraction failed");
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::ExtractionFailed,
                    "Error processing PDF",
                )
            }
            UploadError::Storage(_) => ApiError::internal(ErrorCode::InternalError, err),
            UploadError::Persistence(_) => ApiError::internal(ErrorCode::DatabaseError, err),
        }
    }
}

impl From<DocumentQueryError> for ApiError {
    fn from(err: DocumentQueryError) -> Self {
        match err {
            DocumentQueryError::NotFound(_) | DocumentQueryError::ContentNotFound(_) => {
                ApiError::new(StatusCode::NOT_FOUND, ErrorCode::DocumentNotFound, err.to_string())
            }
            DocumentQueryError::Persistence(e) => ApiError::internal(ErrorCode::DatabaseError, e),
        }
    }
}

impl From<ThreadQueryError> for ApiError {
    fn from(err: ThreadQueryError) -> Self {
        match err {
            ThreadQueryError::ThreadNotFound => {
                ApiError::new(StatusCode::UNAUTHORIZED, ErrorCode::ThreadNotFound, err.to_string())
            }
            ThreadQueryError::Persistence(e) => ApiError::internal(ErrorCode::DatabaseError, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::DocumentId;
    use crate::ports::RepositoryError;

    #[test]
    fn query_errors_map_to_expected_statuses() {
        assert_eq!(ApiError::from(QueryError::ThreadNotFound).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(QueryError::ContextMissing("x".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::from(QueryError::TurnInProgress).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(QueryError::Persistence("disk".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_details_are_not_exposed() {
        let err = ApiError::from(ThreadQueryError::Persistence(RepositoryError::database(
            "no such table: threads",
        )));

        assert_eq!(err.body().message, "Internal server error");
        assert_eq!(err.body().code, "DATABASE_ERROR");
    }

    #[test]
    fn upload_errors_keep_client_messages() {
        let not_pdf = ApiError::from(UploadError::NotPdf);
        assert_eq!(not_pdf.status(), StatusCode::BAD_REQUEST);
        assert_eq!(not_pdf.body().message, "Only PDF files are allowed");

        let extraction = ApiError::from(UploadError::Extraction("bad xref".into()));
        assert_eq!(extraction.body().message, "Error processing PDF");
    }

    #[test]
    fn missing_document_is_404() {
        let err = ApiError::from(DocumentQueryError::NotFound(DocumentId::new(3)));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body().message, "PDF with ID 3 not found");
    }

    #[test]
    fn invalid_token_is_401_with_message() {
        let err = ApiError::from(AuthError::InvalidToken);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.body().message, "Could not validate token");
    }
}
