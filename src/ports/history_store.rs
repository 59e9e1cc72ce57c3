//! History store port.
//!
//! Append-only message history per thread. Appends within one call keep
//! their order and are numbered after everything already stored.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::conversation::{ChatMessage, StoredMessage};
use crate::domain::foundation::ThreadId;

/// One page of stored history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub messages: Vec<StoredMessage>,
    pub total: u64,
}

/// Persistence for per-thread message history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends messages to the end of the thread's history, atomically.
    async fn append(
        &self,
        thread_id: &ThreadId,
        messages: &[ChatMessage],
    ) -> Result<(), RepositoryError>;

    /// Full history, oldest first.
    async fn load(&self, thread_id: &ThreadId) -> Result<Vec<ChatMessage>, RepositoryError>;

    /// A slice of history, oldest first, with the total count.
    async fn page(
        &self,
        thread_id: &ThreadId,
        offset: u32,
        limit: u32,
    ) -> Result<HistoryPage, RepositoryError>;
}
