//! Message types for conversations.
//!
//! `ChatMessage` is the unit handed to the model and kept in thread
//! history. `StoredMessage` is a history entry as it comes back from
//! persistence, with its position in the thread.

use crate::domain::foundation::{ThreadId, Timestamp};
use serde::{Deserialize, Serialize};

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions (never persisted in history).
    System,
    /// User input.
    User,
    /// Model reply.
    Assistant,
}

impl MessageRole {
    /// Lowercase name used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Parses a stored role name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "system" => Some(MessageRole::System),
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

/// A role-tagged piece of conversation content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Estimates the token count for this message.
    ///
    /// Uses a rough heuristic of ~4 characters per token plus a small
    /// per-message overhead for the role marker.
    pub fn estimate_tokens(&self) -> u32 {
        let overhead = 4;
        ((self.content.len() / 4) + overhead) as u32
    }
}

/// A persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Thread this message belongs to.
    pub thread_id: ThreadId,
    /// Zero-based position within the thread.
    pub sequence: i64,
    /// The message itself.
    pub message: ChatMessage,
    /// When the message was appended.
    pub created_at: Timestamp,
}
