//! Thread domain module.
//!
//! A thread scopes one conversation to one user and one document. Both
//! bindings are fixed when the thread is created.

use serde::Serialize;
use thiserror::Error;

use crate::domain::foundation::{DocumentId, ThreadId, Timestamp, UserId};

/// A persisted conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    pub id: ThreadId,
    pub owner: UserId,
    pub document_id: DocumentId,
    pub created_at: Timestamp,
}

/// Why a caller may not continue a thread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThreadAccessError {
    #[error("Thread belongs to another user")]
    NotOwner,
}

impl Thread {
    /// Starts a thread for `owner` bound to `document_id`.
    pub fn start(owner: UserId, document_id: DocumentId) -> Self {
        Self {
            id: ThreadId::generate(),
            owner,
            document_id,
            created_at: Timestamp::now(),
        }
    }

    /// Checks that `user` owns this thread.
    pub fn authorize(&self, user: &UserId) -> Result<(), ThreadAccessError> {
        if &self.owner == user {
            Ok(())
        } else {
            Err(ThreadAccessError::NotOwner)
        }
    }

    /// Resolves which document a turn should use.
    ///
    /// The bound document always wins, whatever the request asked for.
    pub fn effective_document(&self, _requested: Option<DocumentId>) -> DocumentId {
        self.document_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserId {
        UserId::new("alice").unwrap()
    }

    #[test]
    fn start_generates_fresh_id() {
        let a = Thread::start(alice(), DocumentId::new(1));
        let b = Thread::start(alice(), DocumentId::new(1));
        assert_ne!(a.id, b.id);
        assert_eq!(a.document_id, DocumentId::new(1));
    }

    #[test]
    fn owner_is_authorized() {
        let thread = Thread::start(alice(), DocumentId::new(1));
        assert!(thread.authorize(&alice()).is_ok());
    }

    #[test]
    fn other_user_is_rejected() {
        let thread = Thread::start(alice(), DocumentId::new(1));
        let bob = UserId::new("bob").unwrap();
        assert_eq!(thread.authorize(&bob), Err(ThreadAccessError::NotOwner));
    }

    #[test]
    fn bound_document_overrides_requested() {
        let thread = Thread::start(alice(), DocumentId::new(1));
        assert_eq!(thread.effective_document(Some(DocumentId::new(2))), DocumentId::new(1));
        assert_eq!(thread.effective_document(None), DocumentId::new(1));
    }
}
