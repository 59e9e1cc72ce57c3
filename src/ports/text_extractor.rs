//! Text extraction port.

use async_trait::async_trait;
use thiserror::Error;

/// Text extraction failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Could not extract text: {0}")]
    Unreadable(String),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Turns document bytes into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extracts all text from a PDF.
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, ExtractionError>;
}
