//! In-memory file storage and a scripted text extractor.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::document::sanitize_filename;
use crate::ports::{
    ExtractionError, FileStorage, FileStorageError, StoredFile, TextExtractor,
};

/// File storage that keeps bytes in a map keyed by path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFileStorage {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryFileStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub async fn file_count(&self) -> usize {
        self.files.read().await.len()
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, FileStorageError> {
        let mut files = self.files.write().await;
        let path = format!("memory/{}_{}", files.len() + 1, sanitize_filename(filename));
        files.insert(path.clone(), bytes.to_vec());
        Ok(StoredFile {
            path,
            size: bytes.len() as u64,
            checksum: format!("{:x}", Sha256::digest(bytes)),
        })
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, FileStorageError> {
        self.files
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| FileStorageError::NotFound(path.to_string()))
    }
}

/// Text extractor that treats input bytes as UTF-8, or always fails.
#[derive(Debug, Clone, Default)]
pub struct Utf8TextExtractor {
    fail: bool,
}

impl Utf8TextExtractor {
    /// Extractor that decodes bytes as UTF-8 text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor that rejects every input.
    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl TextExtractor for Utf8TextExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        if self.fail {
            return Err(ExtractionError::Unreadable("scripted failure".to_string()));
        }
        String::from_utf8(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stored_bytes_read_back() {
        let storage = InMemoryFileStorage::new();

        let stored = storage.save("a.pdf", b"abc").await.unwrap();

        assert_eq!(storage.read(&stored.path).await.unwrap(), b"abc");
        assert_eq!(storage.file_count().await, 1);
    }

    #[tokio::test]
    async fn utf8_extractor_decodes_and_fails_on_request() {
        assert_eq!(Utf8TextExtractor::new().extract(b"hi".to_vec()).await.unwrap(), "hi");
        assert!(Utf8TextExtractor::failing().extract(b"hi".to_vec()).await.is_err());
    }
}
