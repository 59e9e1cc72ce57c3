//! PDF text extraction.
//!
//! `pdf_extract` is synchronous and CPU bound, and it panics on some
//! malformed inputs, so extraction runs on the blocking pool and a panic is
//! reported as an unreadable document.

use async_trait::async_trait;

use crate::ports::{ExtractionError, TextExtractor};

/// Extracts text with the `pdf-extract` crate.
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Creates a new extractor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        let size = bytes.len();
        let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                if e.is_panic() {
                    ExtractionError::Unreadable("PDF parser panicked".to_string())
                } else {
                    ExtractionError::Task(e.to_string())
                }
            })?;

        let text = result.map_err(|e| ExtractionError::Unreadable(format!("PDF parse error: {}", e)))?;
        tracing::debug!(bytes = size, chars = text.chars().count(), "Extracted PDF text");
        Ok(text)
    }
}
