//! UploadDocumentHandler - stores a PDF and its extracted text.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::document::{is_pdf_content_type, text_preview, Document, NewDocument, PDF_CONTENT_TYPE};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{DocumentRepository, FileStorage, TextExtractor};

/// Command to upload one file.
#[derive(Debug, Clone)]
pub struct UploadDocumentCommand {
    pub owner: UserId,
    pub filename: String,
    /// Content type declared by the client for the multipart field.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadDocumentResult {
    pub document: Document,
    pub text_preview: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Only PDF files are allowed")]
    NotPdf,

    #[error("File exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },

    #[error("Failed to store file: {0}")]
    Storage(String),

    #[error("Error processing PDF: {0}")]
    Extraction(String),

    #[error("Failed to save document: {0}")]
    Persistence(String),
}

/// Limits applied to uploads.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_bytes: usize,
    pub preview_chars: usize,
}

/// Handler for `POST /upload`.
pub struct UploadDocumentHandler {
    documents: Arc<dyn DocumentRepository>,
    files: Arc<dyn FileStorage>,
    extractor: Arc<dyn TextExtractor>,
    limits: UploadLimits,
}

impl UploadDocumentHandler {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        files: Arc<dyn FileStorage>,
        extractor: Arc<dyn TextExtractor>,
        limits: UploadLimits,
    ) -> Self {
        Self {
            documents,
            files,
            extractor,
            limits,
        }
    }

    pub async fn handle(&self, cmd: UploadDocumentCommand) -> Result<UploadDocumentResult, UploadError> {
        // 1. Validate
        if !cmd.content_type.as_deref().is_some_and(is_pdf_content_type) {
            return Err(UploadError::NotPdf);
        }
        if cmd.bytes.len() > self.limits.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.limits.max_bytes,
            });
        }

        // 2. Store the bytes
        let stored = self
            .files
            .save(&cmd.filename, &cmd.bytes)
            .await
            .map_err(|e| UploadError::Storage(e.to_string()))?;

        // 3. Extract text
        let text = self
            .extractor
            .extract(cmd.bytes)
            .await
            .map_err(|e| UploadError::Extraction(e.to_string()))?;

        // 4. Persist metadata and text together
        let new = NewDocument {
            owner: cmd.owner,
            filename: cmd.filename,
            file_path: stored.path,
            content_type: PDF_CONTENT_TYPE.to_string(),
            file_size: stored.size as i64,
            checksum: stored.checksum,
            uploaded_at: Timestamp::now(),
        };
        let document = self
            .documents
            .insert(new, Some(&text))
            .await
            .map_err(|e| UploadError::Persistence(e.to_string()))?;

        tracing::info!(
            document_id = %document.id,
            user_id = %document.owner,
            size = document.file_size,
            "PDF uploaded"
        );

        Ok(UploadDocumentResult {
            text_preview: text_preview(&text, self.limits.preview_chars),
            document,
        })
    }
}
