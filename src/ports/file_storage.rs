//! File storage port for uploaded document bytes.

use async_trait::async_trait;
use thiserror::Error;

/// Result of writing an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Location to record in document metadata.
    pub path: String,
    /// Bytes written.
    pub size: u64,
    /// Hex-encoded SHA-256 of the contents.
    pub checksum: String,
}

/// File storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FileStorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage I/O error: {0}")]
    Io(String),
}

/// Stores raw upload bytes.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `bytes` under a name derived from `filename`.
    ///
    /// Implementations must not overwrite an earlier upload with the same name.
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, FileStorageError>;

    /// Reads back a previously stored file.
    async fn read(&self, path: &str) -> Result<Vec<u8>, FileStorageError>;
}
