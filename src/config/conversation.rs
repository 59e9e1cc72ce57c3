//! Conversation engine tuning

use serde::Deserialize;

use super::error::ValidationError;

/// Limits applied when building the model context from persisted history.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Token budget for the whole model context, preamble included
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: u32,

    /// Tokens held back from the budget for the reply
    #[serde(default = "default_reserved_for_response")]
    pub reserved_for_response: u32,

    /// Hard cap on history messages sent per turn, if any
    pub max_history_messages: Option<usize>,

    /// Add a short note when older messages were left out
    #[serde(default = "default_true")]
    pub include_truncation_summary: bool,

    /// Fragments buffered between the model task and the response body
    #[serde(default = "default_fragment_buffer")]
    pub fragment_buffer: usize,
}

impl ConversationConfig {
    /// Validate conversation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reserved_for_response >= self.max_context_tokens {
            return Err(ValidationError::InvalidContextBudget);
        }
        if self.fragment_buffer == 0 {
            return Err(ValidationError::InvalidFragmentBuffer);
        }
        if self.max_history_messages == Some(0) {
            return Err(ValidationError::InvalidHistoryLimit);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_context_tokens: default_max_context_tokens(),
            reserved_for_response: default_reserved_for_response(),
            max_history_messages: None,
            include_truncation_summary: true,
            fragment_buffer: default_fragment_buffer(),
        }
    }
}

fn default_max_context_tokens() -> u32 {
    1_000_000
}

fn default_reserved_for_response() -> u32 {
    8_192
}

fn default_true() -> bool {
    true
}

fn default_fragment_buffer() -> usize {
    64
}
