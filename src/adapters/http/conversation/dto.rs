//! Request body for `POST /query`.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::Turn;

/// One message as sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryMessage {
    pub role: String,
    pub content: String,
}

impl From<QueryMessage> for Turn {
    fn from(msg: QueryMessage) -> Self {
        Turn::new(msg.role, msg.content)
    }
}

/// Body of `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Document for a new thread. Ignored when continuing a thread.
    #[serde(default)]
    pub pdf_id: Option<i64>,
    #[serde(default)]
    pub messages: Vec<QueryMessage>,
}
