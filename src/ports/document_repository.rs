//! Document repository port.
//!
//! Metadata and extracted text are separate records sharing one id, so a
//! document can exist while its text is missing (and later re-extracted).

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::document::{Document, NewDocument};
use crate::domain::foundation::{DocumentId, UserId};

/// Persistence for uploaded document metadata and text.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Stores metadata and, when available, the extracted text in one
    /// transaction. Returns the document with its assigned id.
    async fn insert(
        &self,
        document: NewDocument,
        text: Option<&str>,
    ) -> Result<Document, RepositoryError>;

    /// Find a document by id.
    ///
    /// Returns `None` if not found.
    async fn find(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError>;

    /// All documents uploaded by `owner`, newest first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Document>, RepositoryError>;

    /// Extracted text for a document, if stored.
    async fn find_text(&self, id: DocumentId) -> Result<Option<String>, RepositoryError>;

    /// Stores (or replaces) the extracted text for an existing document.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the document doesn't exist
    async fn store_text(&self, id: DocumentId, text: &str) -> Result<(), RepositoryError>;
}
