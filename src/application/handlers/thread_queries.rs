//! Read-side handlers for threads and their history.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{ThreadId, UserId};
use crate::domain::thread::Thread;
use crate::ports::{HistoryPage, HistoryStore, RepositoryError, ThreadRepository};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThreadQueryError {
    /// Unknown thread, or one owned by another user.
    #[error("Thread not found")]
    ThreadNotFound,

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Handler for `GET /threads` and `GET /threads/:id/messages`.
pub struct ThreadQueryHandler {
    threads: Arc<dyn ThreadRepository>,
    history: Arc<dyn HistoryStore>,
}

impl ThreadQueryHandler {
    pub fn new(threads: Arc<dyn ThreadRepository>, history: Arc<dyn HistoryStore>) -> Self {
        Self { threads, history }
    }

    /// Lists the caller's threads, newest first.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<Thread>, ThreadQueryError> {
        Ok(self.threads.list_for_owner(owner).await?)
    }

    /// Returns one page of a thread's persisted history.
    pub async fn messages(
        &self,
        owner: &UserId,
        thread_id: &ThreadId,
        offset: u32,
        limit: u32,
    ) -> Result<HistoryPage, ThreadQueryError> {
        let thread = self
            .threads
            .find(thread_id)
            .await?
            .ok_or(ThreadQueryError::ThreadNotFound)?;
        thread
            .authorize(owner)
            .map_err(|_| ThreadQueryError::ThreadNotFound)?;

        Ok(self.history.page(thread_id, offset, limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryHistoryStore, InMemoryThreadRepository};
    use crate::domain::conversation::ChatMessage;
    use crate::domain::foundation::DocumentId;

    #[tokio::test]
    async fn owner_pages_through_history() {
        let threads = InMemoryThreadRepository::new();
        let history = InMemoryHistoryStore::new();
        let alice = UserId::new("alice").unwrap();
        let thread = Thread::start(alice.clone(), DocumentId::new(1));
        threads.create(&thread).await.unwrap();
        history
            .append(
                &thread.id,
                &[ChatMessage::user("q"), ChatMessage::assistant("a"), ChatMessage::user("q2")],
            )
            .await
            .unwrap();
        let handler = ThreadQueryHandler::new(Arc::new(threads), Arc::new(history));

        let page = handler.messages(&alice, &thread.id, 1, 1).await.unwrap();

        assert_eq!(page.total, 3);
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].message, ChatMessage::assistant("a"));
        assert_eq!(handler.list(&alice).await.unwrap(), vec![thread]);
    }

    #[tokio::test]
    async fn foreign_or_unknown_thread_is_not_found() {
        let threads = InMemoryThreadRepository::new();
        let thread = Thread::start(UserId::new("alice").unwrap(), DocumentId::new(1));
        threads.create(&thread).await.unwrap();
        let handler = ThreadQueryHandler::new(Arc::new(threads), Arc::new(InMemoryHistoryStore::new()));
        let bob = UserId::new("bob").unwrap();

        assert_eq!(
            handler.messages(&bob, &thread.id, 0, 10).await,
            Err(ThreadQueryError::ThreadNotFound)
        );
        assert_eq!(
            handler.messages(&bob, &ThreadId::generate(), 0, 10).await,
            Err(ThreadQueryError::ThreadNotFound)
        );
    }
}
