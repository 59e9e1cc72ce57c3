//! Read-side handlers for uploaded documents.

use std::sync::Arc;

use thiserror::Error;

use crate::application::{ContextAssembler, ContextError};
use crate::domain::document::Document;
use crate::domain::foundation::{DocumentId, UserId};
use crate::ports::{DocumentRepository, RepositoryError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentQueryError {
    #[error("PDF with ID {0} not found")]
    NotFound(DocumentId),

    #[error("Content for PDF with ID {0} not found")]
    ContentNotFound(DocumentId),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl From<ContextError> for DocumentQueryError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::DocumentNotFound(id) => DocumentQueryError::NotFound(id),
            ContextError::TextUnavailable(id) => DocumentQueryError::ContentNotFound(id),
            ContextError::Persistence(e) => DocumentQueryError::Persistence(e),
        }
    }
}

/// A document, optionally with its text.
#[derive(Debug, Clone)]
pub struct DocumentView {
    pub document: Document,
    pub text_content: Option<String>,
}

/// Handler for `GET /pdfs` and `GET /pdfs/:id[/content]`.
pub struct DocumentQueryHandler {
    documents: Arc<dyn DocumentRepository>,
    context: ContextAssembler,
}

impl DocumentQueryHandler {
    pub fn new(documents: Arc<dyn DocumentRepository>, context: ContextAssembler) -> Self {
        Self { documents, context }
    }

    /// Lists the caller's documents, newest first.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<Document>, DocumentQueryError> {
        Ok(self.documents.list_for_owner(owner).await?)
    }

    /// Returns one document, with its text when `include_content` is set.
    pub async fn get(
        &self,
        owner: &UserId,
        id: DocumentId,
        include_content: bool,
    ) -> Result<DocumentView, DocumentQueryError> {
        let document = self.context.owned_document(owner, id).await?;
        let text_content = if include_content {
            Some(self.context.document_text(owner, id).await?)
        } else {
            None
        };
        Ok(DocumentView {
            document,
            text_content,
        })
    }

    /// Returns the extracted text of one document.
    pub async fn content(&self, owner: &UserId, id: DocumentId) -> Result<String, DocumentQueryError> {
        Ok(self.context.document_text(owner, id).await?)
    }
}
