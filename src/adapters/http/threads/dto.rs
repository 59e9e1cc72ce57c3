//! Response bodies and query parameters for thread endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::StoredMessage;
use crate::domain::thread::Thread;
use crate::ports::HistoryPage;

/// Default page size for history.
pub const DEFAULT_LIMIT: u32 = 50;

/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Pagination for `GET /threads/:thread_id/messages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl PaginationParams {
    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }

    /// Requested limit clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// One thread as listed to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadView {
    pub thread_id: String,
    pub pdf_id: i64,
    pub created_at: String,
}

impl From<&Thread> for ThreadView {
    fn from(thread: &Thread) -> Self {
        Self {
            thread_id: thread.id.to_string(),
            pdf_id: thread.document_id.as_i64(),
            created_at: thread.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    pub sequence: i64,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

impl From<&StoredMessage> for MessageView {
    fn from(stored: &StoredMessage) -> Self {
        Self {
            sequence: stored.sequence,
            role: stored.message.role.as_str().to_string(),
            content: stored.message.content.clone(),
            created_at: stored.created_at.to_rfc3339(),
        }
    }
}

/// Body of `GET /threads/:thread_id/messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessagePageView {
    pub thread_id: String,
    pub messages: Vec<MessageView>,
    pub total: u64,
    pub offset: u32,
    pub limit: u32,
}

impl MessagePageView {
    pub fn new(thread_id: String, page: &HistoryPage, offset: u32, limit: u32) -> Self {
        Self {
            thread_id,
            messages: page.messages.iter().map(MessageView::from).collect(),
            total: page.total,
            offset,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(PaginationParams::default().limit(), DEFAULT_LIMIT);
        let huge = PaginationParams {
            offset: None,
            limit: Some(10_000),
        };
        assert_eq!(huge.limit(), MAX_LIMIT);
        let zero = PaginationParams {
            offset: Some(5),
            limit: Some(0),
        };
        assert_eq!(zero.limit(), 1);
        assert_eq!(zero.offset(), 5);
    }
}
