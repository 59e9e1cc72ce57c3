//! Resolves a document to its text and builds the turn's message list.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::conversation::{assemble, AssembledTurn, Turn};
use crate::domain::document::Document;
use crate::domain::foundation::{DocumentId, UserId};
use crate::ports::{DocumentRepository, FileStorage, RepositoryError, TextExtractor};

/// Why a document's text could not be supplied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// Unknown id, or a document owned by someone else.
    #[error("PDF with ID {0} not found")]
    DocumentNotFound(DocumentId),

    /// Metadata exists but no text is stored or recoverable.
    #[error("No text available for PDF {0}")]
    TextUnavailable(DocumentId),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Looks up documents for the caller and assembles model input.
#[derive(Clone)]
pub struct ContextAssembler {
    documents: Arc<dyn DocumentRepository>,
    files: Arc<dyn FileStorage>,
    extractor: Arc<dyn TextExtractor>,
}

impl ContextAssembler {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        files: Arc<dyn FileStorage>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            documents,
            files,
            extractor,
        }
    }

    /// Assembles `turns` against the text of document `id`.
    pub async fn assemble(
        &self,
        owner: &UserId,
        id: DocumentId,
        turns: &[Turn],
    ) -> Result<AssembledTurn, ContextError> {
        let text = self.document_text(owner, id).await?;
        let assembled = assemble(&text, turns);

        let dropped = assembled.dropped(turns.len());
        if dropped > 0 {
            tracing::debug!(document_id = %id, dropped, "Dropped turns with unknown roles");
        }
        Ok(assembled)
    }

    /// Returns the document if `owner` may see it.
    pub async fn owned_document(
        &self,
        owner: &UserId,
        id: DocumentId,
    ) -> Result<Document, ContextError> {
        match self.documents.find(id).await? {
            Some(doc) if doc.is_owned_by(owner) => Ok(doc),
            Some(_) => {
                tracing::warn!(document_id = %id, user_id = %owner, "Document owned by another user");
                Err(ContextError::DocumentNotFound(id))
            }
            None => Err(ContextError::DocumentNotFound(id)),
        }
    }

    /// Returns the extracted text of a document owned by `owner`.
    ///
    /// Missing text is re-extracted from the stored file and saved.
    pub async fn document_text(&self, owner: &UserId, id: DocumentId) -> Result<String, ContextError> {
        let document = self.owned_document(owner, id).await?;

        if let Some(text) = self.documents.find_text(id).await? {
            return Ok(text);
        }

        tracing::info!(document_id = %id, "Document text missing, re-extracting");
        let bytes = self.files.read(&document.file_path).await.map_err(|e| {
            tracing::warn!(document_id = %id, error = %e, "Stored file unavailable");
            ContextError::TextUnavailable(id)
        })?;
        let text = self.extractor.extract(bytes).await.map_err(|e| {
            tracing::warn!(document_id = %id, error = %e, "Re-extraction failed");
            ContextError::TextUnavailable(id)
        })?;

        self.documents.store_text(id, &text).await?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryDocumentRepository, InMemoryFileStorage, Utf8TextExtractor};
    use crate::domain::conversation::{ChatMessage, MessageRole};
    use crate::domain::document::NewDocument;
    use crate::domain::foundation::Timestamp;

    struct Fixture {
        documents: InMemoryDocumentRepository,
        files: InMemoryFileStorage,
        assembler: ContextAssembler,
    }

    fn fixture_with(extractor: Utf8TextExtractor) -> Fixture {
        let documents = InMemoryDocumentRepository::new();
        let files = InMemoryFileStorage::new();
        let assembler = ContextAssembler::new(
            Arc::new(documents.clone()),
            Arc::new(files.clone()),
            Arc::new(extractor),
        );
        Fixture {
            documents,
            files,
            assembler,
        }
    }

    fn owner() -> UserId {
        UserId::new("owner").unwrap()
    }

    async fn upload(fx: &Fixture, text: &str, store_text: bool) -> DocumentId {
        let stored = fx.files.save("doc.pdf", text.as_bytes()).await.unwrap();
        let new = NewDocument {
            owner: owner(),
            filename: "doc.pdf".to_string(),
            file_path: stored.path,
            content_type: "application/pdf".to_string(),
            file_size: stored.size as i64,
            checksum: stored.checksum,
            uploaded_at: Timestamp::now(),
        };
        let text = store_text.then_some(text);
        fx.documents.insert(new, text).await.unwrap().id
    }

    #[tokio::test]
    async fn assembles_with_stored_text() {
        let fx = fixture_with(Utf8TextExtractor::new());
        let id = upload(&fx, "The contract ends in May.", true).await;

        let assembled = fx
            .assembler
            .assemble(&owner(), id, &[Turn::new("user", "When?"), Turn::new("tool", "x")])
            .await
            .unwrap();

        assert_eq!(assembled.preamble.len(), 2);
        assert!(assembled.preamble[1].content.contains("The contract ends in May."));
        assert_eq!(assembled.turns, vec![ChatMessage::user("When?")]);
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let fx = fixture_with(Utf8TextExtractor::new());

        let result = fx.assembler.document_text(&owner(), DocumentId::new(9)).await;

        assert_eq!(result, Err(ContextError::DocumentNotFound(DocumentId::new(9))));
    }

    #[tokio::test]
    async fn foreign_document_is_not_found() {
        let fx = fixture_with(Utf8TextExtractor::new());
        let id = upload(&fx, "secret", true).await;

        let result = fx
            .assembler
            .document_text(&UserId::new("intruder").unwrap(), id)
            .await;

        assert_eq!(result, Err(ContextError::DocumentNotFound(id)));
    }

    #[tokio::test]
    async fn missing_text_is_re_extracted_and_stored() {
        let fx = fixture_with(Utf8TextExtractor::new());
        let id = upload(&fx, "recovered text", false).await;

        let text = fx.assembler.document_text(&owner(), id).await.unwrap();

        assert_eq!(text, "recovered text");
        assert_eq!(fx.documents.find_text(id).await.unwrap().as_deref(), Some("recovered text"));
    }

    #[tokio::test]
    async fn unrecoverable_text_is_unavailable() {
        let fx = fixture_with(Utf8TextExtractor::failing());
        let id = upload(&fx, "x", false).await;

        let result = fx.assembler.document_text(&owner(), id).await;

        assert_eq!(result, Err(ContextError::TextUnavailable(id)));
    }

    #[tokio::test]
    async fn preamble_comes_first() {
        let fx = fixture_with(Utf8TextExtractor::new());
        let id = upload(&fx, "t", true).await;

        let messages = fx
            .assembler
            .assemble(&owner(), id, &[Turn::new("ai", "earlier"), Turn::new("user", "now")])
            .await
            .unwrap()
            .to_messages();

        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::System,
                MessageRole::Assistant,
                MessageRole::User
            ]
        );
    }
}
