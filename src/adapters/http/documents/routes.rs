//! Axum routes for document endpoints.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use super::handlers::{get_pdf, get_pdf_content, list_pdfs, upload_pdf};
use crate::adapters::http::AppState;

/// Multipart framing allowance on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates routes for document endpoints.
///
/// - POST /upload - Upload a PDF
/// - GET /pdfs - List the caller's PDFs
/// - GET /pdfs/:pdf_id - One PDF, `?include_content=true` for its text
/// - GET /pdfs/:pdf_id/content - Text of one PDF
pub fn document_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload_pdf).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/pdfs", get(list_pdfs))
        .route("/pdfs/:pdf_id", get(get_pdf))
        .route("/pdfs/:pdf_id/content", get(get_pdf_content))
}
