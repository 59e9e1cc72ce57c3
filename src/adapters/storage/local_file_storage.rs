//! Local Filesystem Storage Adapter - Implementation of FileStorage.
//!
//! Stores uploaded PDFs flat in one directory. Each stored name gets a
//! random prefix so two uploads with the same filename never collide.
//! Uses write-to-temp-then-rename and SHA-256 checksums.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::document::sanitize_filename;
use crate::ports::{FileStorage, FileStorageError, StoredFile};

/// Local filesystem storage for uploads.
///
/// # Directory Structure
///
/// ```text
/// {base_path}/
/// ├── 3f2a..._report.pdf
/// └── 9c41..._report.pdf
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    /// Upload directory.
    base_path: PathBuf,
}

impl LocalFileStorage {
    /// Creates a new local file storage rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Returns the upload directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Ensures the upload directory exists.
    pub async fn ensure_dir(&self) -> Result<(), FileStorageError> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            FileStorageError::Io(format!(
                "Failed to create upload directory {}: {}",
                self.base_path.display(),
                e
            ))
        })
    }

    /// Computes SHA-256 checksum of the given content.
    fn compute_checksum(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        format!("{:x}", hasher.finalize())
    }

    fn stored_name(filename: &str) -> String {
        format!("{}_{}", Uuid::new_v4().simple(), sanitize_filename(filename))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, FileStorageError> {
        self.ensure_dir().await?;

        let final_path = self.base_path.join(Self::stored_name(filename));
        let temp_path = final_path.with_extension("part");

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            FileStorageError::Io(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(bytes).await.map_err(|e| {
            FileStorageError::Io(format!(
                "Failed to write to temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            FileStorageError::Io(format!(
                "Failed to sync temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            FileStorageError::Io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %final_path.display(), size = bytes.len(), "Stored upload");

        Ok(StoredFile {
            path: final_path.to_string_lossy().into_owned(),
            size: bytes.len() as u64,
            checksum: Self::compute_checksum(bytes),
        })
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, FileStorageError> {
        fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                FileStorageError::NotFound(path.to_string())
            } else {
                FileStorageError::Io(format!("Failed to read {}: {}", path, e))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage() -> (LocalFileStorage, TempDir) {
        let dir = TempDir::new().unwrap();
        (LocalFileStorage::new(dir.path().join("uploads")), dir)
    }

    #[tokio::test]
    async fn save_creates_directory_and_reads_back() {
        let (storage, _dir) = storage();

        let stored = storage.save("report.pdf", b"%PDF-1.4 data").await.unwrap();

        assert!(stored.path.ends_with("_report.pdf"));
        assert_eq!(stored.size, 13);
        assert_eq!(storage.read(&stored.path).await.unwrap(), b"%PDF-1.4 data");
    }

    #[tokio::test]
    async fn same_filename_does_not_overwrite() {
        let (storage, _dir) = storage();

        let first = storage.save("a.pdf", b"one").await.unwrap();
        let second = storage.save("a.pdf", b"two").await.unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(storage.read(&first.path).await.unwrap(), b"one");
    }

    #[tokio::test]
    async fn checksum_is_sha256_hex() {
        let (storage, _dir) = storage();

        let stored = storage.save("a.pdf", b"hello").await.unwrap();

        assert_eq!(
            stored.checksum,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[tokio::test]
    async fn path_components_in_filename_stay_inside_directory() {
        let (storage, _dir) = storage();

        let stored = storage.save("../../etc/passwd.pdf", b"x").await.unwrap();

        assert!(Path::new(&stored.path).starts_with(storage.base_path()));
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let (storage, _dir) = storage();

        let result = storage.read("/definitely/not/here.pdf").await;

        assert!(matches!(result, Err(FileStorageError::NotFound(_))));
    }
}
