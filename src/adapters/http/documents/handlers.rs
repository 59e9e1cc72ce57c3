//! HTTP handlers for document endpoints.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::{IncludeContentParams, PdfContentView, PdfDetailView, PdfListView, PdfSummary, UploadView};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::adapters::http::AppState;
use crate::application::handlers::{UploadDocumentCommand, UploadError};
use crate::domain::foundation::DocumentId;

// ════════════════════════════════════════════════════════════════════════════════
// POST /upload
// ════════════════════════════════════════════════════════════════════════════════

/// POST /upload - Store a PDF from the multipart field `file`.
///
/// # Errors
/// - 400 Bad Request: Missing `file` field, or not a PDF
/// - 401 Unauthorized: No valid session
/// - 413 Payload Too Large: Above the configured upload limit
/// - 500 Internal Server Error: Text extraction failed
pub async fn upload_pdf(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Json<UploadView>, ApiError> {
    let limit = state.max_upload_bytes;
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        upload = Some(UploadDocumentCommand {
            owner: user.id.clone(),
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let cmd = upload.ok_or_else(|| ApiError::bad_request("Missing multipart field 'file'"))?;
    let result = state.upload.handle(cmd).await?;
    let doc = result.document;

    Ok(Json(UploadView {
        id: doc.id.as_i64(),
        filename: doc.filename,
        content_type: doc.content_type,
        file_path: doc.file_path,
        file_size: doc.file_size,
        message: "PDF uploaded successfully".to_string(),
        text_preview: result.text_preview,
    }))
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { limit }.into()
    } else {
        ApiError::bad_request(err.body_text())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /pdfs
// ════════════════════════════════════════════════════════════════════════════════

/// GET /pdfs - List the caller's documents.
pub async fn list_pdfs(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<PdfListView>, ApiError> {
    let documents = state.documents.list(&user.id).await?;
    Ok(Json(PdfListView {
        pdfs: documents.iter().map(PdfSummary::from).collect(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// GET /pdfs/:pdf_id
// ════════════════════════════════════════════════════════════════════════════════

/// GET /pdfs/:pdf_id - One document, optionally with its text.
///
/// # Errors
/// - 400 Bad Request: Id is not an integer
/// - 404 Not Found: Unknown id or not owned by the caller
pub async fn get_pdf(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(pdf_id): Path<String>,
    Query(params): Query<IncludeContentParams>,
) -> Result<Json<PdfDetailView>, ApiError> {
    let id = parse_pdf_id(&pdf_id)?;
    let view = state
        .documents
        .get(&user.id, id, params.include_content)
        .await?;

    Ok(Json(PdfDetailView {
        summary: PdfSummary::from(&view.document),
        text_content: view.text_content,
    }))
}

/// GET /pdfs/:pdf_id/content - Extracted text of one document.
pub async fn get_pdf_content(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(pdf_id): Path<String>,
) -> Result<Json<PdfContentView>, ApiError> {
    let id = parse_pdf_id(&pdf_id)?;
    let text_content = state.documents.content(&user.id, id).await?;

    Ok(Json(PdfContentView {
        pdf_id: id.as_i64(),
        text_content,
    }))
}

fn parse_pdf_id(raw: &str) -> Result<DocumentId, ApiError> {
    raw.parse::<DocumentId>()
        .map_err(|e| ApiError::bad_request(e.to_string()))
}
