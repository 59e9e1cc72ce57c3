//! Context window management for model calls.
//!
//! Thread history grows without bound in storage. Before each call the
//! history is cut down to what fits: the preamble is always kept, then
//! messages are taken newest-first until the token budget or the message
//! cap is reached.

use super::message::{ChatMessage, MessageRole};
use crate::config::ConversationConfig;

/// Token budget for one model call.
#[derive(Debug, Clone, Copy)]
pub struct TokenBudget {
    /// Maximum tokens for context (preamble + history).
    pub max_context_tokens: u32,
    /// Tokens reserved for the model's reply.
    pub reserved_for_response: u32,
}

impl TokenBudget {
    /// Creates a new token budget.
    pub fn new(max_context_tokens: u32, reserved_for_response: u32) -> Self {
        Self {
            max_context_tokens,
            reserved_for_response,
        }
    }

    /// Returns the available tokens for messages (context minus reserved).
    pub fn available_for_messages(&self) -> u32 {
        self.max_context_tokens.saturating_sub(self.reserved_for_response)
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self::new(1_000_000, 8_192)
    }
}

/// Configuration for context window management.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Token budget for this context.
    pub budget: TokenBudget,
    /// Upper bound on history messages, independent of tokens.
    pub max_history_messages: Option<usize>,
    /// Whether to include a summary of truncated messages.
    pub include_truncation_summary: bool,
    /// Maximum messages to include in truncation summary.
    pub max_summary_messages: usize,
}

impl ContextConfig {
    /// Creates a new config with the given budget.
    pub fn new(budget: TokenBudget) -> Self {
        Self {
            budget,
            max_history_messages: None,
            include_truncation_summary: true,
            max_summary_messages: 3,
        }
    }

    /// Sets the history message cap.
    pub fn with_max_history_messages(mut self, max: usize) -> Self {
        self.max_history_messages = Some(max);
        self
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::new(TokenBudget::default())
    }
}

impl From<&ConversationConfig> for ContextConfig {
    fn from(config: &ConversationConfig) -> Self {
        Self {
            budget: TokenBudget::new(config.max_context_tokens, config.reserved_for_response),
            max_history_messages: config.max_history_messages,
            include_truncation_summary: config.include_truncation_summary,
            max_summary_messages: 3,
        }
    }
}

/// Result of building a context.
#[derive(Debug, Clone)]
pub struct BuiltContext {
    /// The messages to send to the model.
    pub messages: Vec<ChatMessage>,
    /// Number of history messages that were left out.
    pub truncated_count: usize,
    /// Estimated total tokens in the context.
    pub estimated_tokens: u32,
}

impl BuiltContext {
    /// Returns true if any messages were truncated.
    pub fn was_truncated(&self) -> bool {
        self.truncated_count > 0
    }
}

/// Fits preamble plus history into a token budget.
#[derive(Debug, Clone, Default)]
pub struct ContextWindowManager {
    config: ContextConfig,
}

impl ContextWindowManager {
    /// Creates a new manager with the given configuration.
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    /// Builds the message list for a model call.
    ///
    /// The preamble is included unconditionally even when it alone exceeds
    /// the budget; only history is ever dropped. The newest history message
    /// is always included so the model sees the turn it is answering, even
    /// under a message cap of zero.
    pub fn build_context(&self, preamble: &[ChatMessage], history: &[ChatMessage]) -> BuiltContext {
        let available_tokens = self.config.budget.available_for_messages();
        let mut token_count: u32 = preamble.iter().map(ChatMessage::estimate_tokens).sum();

        let max_messages = self.config.max_history_messages.unwrap_or(usize::MAX);
        let mut included_from = history.len();

        // Work backward from most recent messages
        for (i, msg) in history.iter().enumerate().rev() {
            let is_newest = i + 1 == history.len();
            if !is_newest && history.len() - i > max_messages {
                break;
            }
            let msg_tokens = msg.estimate_tokens();
            if !is_newest && token_count + msg_tokens > available_tokens {
                break;
            }
            token_count += msg_tokens;
            included_from = i;
        }

        let truncated_count = included_from;
        let mut messages = preamble.to_vec();

        if truncated_count > 0 && self.config.include_truncation_summary {
            let summary = self.summarize_truncated(&history[..truncated_count]);
            let summary_tokens = ChatMessage::system(summary.as_str()).estimate_tokens();

            // Only add if we have room
            if token_count + summary_tokens <= available_tokens {
                messages.push(ChatMessage::system(summary));
                token_count += summary_tokens;
            }
        }

        messages.extend_from_slice(&history[included_from..]);

        BuiltContext {
            messages,
            truncated_count,
            estimated_tokens: token_count,
        }
    }

    /// Creates a summary of truncated messages.
    fn summarize_truncated(&self, truncated: &[ChatMessage]) -> String {
        let snippets: Vec<String> = truncated
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .take(self.config.max_summary_messages)
            .map(|msg| {
                let snippet: String = msg.content.chars().take(50).collect();
                if msg.content.chars().count() > 50 {
                    format!("{}...", snippet)
                } else {
                    snippet
                }
            })
            .collect();

        format!(
            "[Earlier conversation ({} messages truncated): {}]",
            truncated.len(),
            snippets.join("; ")
        )
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preamble() -> Vec<ChatMessage> {
        vec![ChatMessage::system("Instruction"), ChatMessage::system("Document")]
    }

    fn create_messages(count: usize, content_len: usize) -> Vec<ChatMessage> {
        (0..count)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("User message {} {}", i, "x".repeat(content_len)))
                } else {
                    ChatMessage::assistant(format!("Assistant reply {} {}", i, "x".repeat(content_len)))
                }
            })
            .collect()
    }

    mod token_budget {
        use super::*;

        #[test]
        fn available_for_messages_subtracts_reserved() {
            let budget = TokenBudget::new(16_000, 2_000);
            assert_eq!(budget.available_for_messages(), 14_000);
        }

        #[test]
        fn available_for_messages_handles_underflow() {
            let budget = TokenBudget::new(1_000, 2_000);
            assert_eq!(budget.available_for_messages(), 0);
        }
    }

    mod context_window_manager {
        use super::*;

        #[test]
        fn keeps_preamble_first() {
            let manager = ContextWindowManager::default();
            let context = manager.build_context(&preamble(), &create_messages(2, 10));

            assert_eq!(context.messages[0].content, "Instruction");
            assert_eq!(context.messages[1].content, "Document");
        }

        #[test]
        fn includes_everything_when_it_fits() {
            let manager = ContextWindowManager::default();
            let history = create_messages(6, 10);

            let context = manager.build_context(&preamble(), &history);

            assert_eq!(context.messages.len(), 8);
            assert!(!context.was_truncated());
            assert_eq!(&context.messages[2..], &history[..]);
        }

        #[test]
        fn truncates_oldest_when_over_budget() {
            let config = ContextConfig::new(TokenBudget::new(200, 20));
            let manager = ContextWindowManager::new(config);
            let history = create_messages(10, 100);

            let context = manager.build_context(&preamble(), &history);

            assert!(context.was_truncated());
            let last = context.messages.last().unwrap();
            assert_eq!(last, history.last().unwrap());
        }

        #[test]
        fn newest_message_survives_tiny_budget() {
            let config = ContextConfig::new(TokenBudget::new(10, 5));
            let manager = ContextWindowManager::new(config);
            let history = create_messages(3, 400);

            let context = manager.build_context(&preamble(), &history);

            assert_eq!(context.truncated_count, 2);
            assert_eq!(context.messages.last(), history.last());
        }

        #[test]
        fn preamble_is_kept_even_when_over_budget() {
            let config = ContextConfig::new(TokenBudget::new(10, 5));
            let manager = ContextWindowManager::new(config);
            let big = vec![ChatMessage::system("x".repeat(4000)), ChatMessage::system("doc")];

            let context = manager.build_context(&big, &[]);

            assert_eq!(context.messages.len(), 2);
            assert!(context.estimated_tokens > 10);
        }

        #[test]
        fn message_cap_limits_history() {
            let config = ContextConfig::default().with_max_history_messages(4);
            let manager = ContextWindowManager::new(config);
            let history = create_messages(10, 5);

            let context = manager.build_context(&preamble(), &history);

            assert_eq!(context.truncated_count, 6);
            let tail: Vec<_> = context
                .messages
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .cloned()
                .collect();
            assert_eq!(tail, history[6..].to_vec());
        }

        #[test]
        fn zero_message_cap_still_sends_newest_turn() {
            let mut config = ContextConfig::default().with_max_history_messages(0);
            config.include_truncation_summary = false;
            let manager = ContextWindowManager::new(config);
            let history = create_messages(3, 5);

            let context = manager.build_context(&preamble(), &history);

            assert_eq!(context.truncated_count, 2);
            assert_eq!(context.messages.len(), 3);
            assert_eq!(context.messages.last(), history.last());
        }

        #[test]
        fn adds_truncation_summary_when_enabled() {
            let config = ContextConfig::default().with_max_history_messages(2);
            let manager = ContextWindowManager::new(config);
            let history = create_messages(6, 5);

            let context = manager.build_context(&preamble(), &history);

            assert_eq!(context.messages[2].role, MessageRole::System);
            assert!(context.messages[2]
                .content
                .starts_with("[Earlier conversation (4 messages truncated)"));
            assert!(context.messages[2].content.contains("User message 0"));
        }

        #[test]
        fn skips_truncation_summary_when_disabled() {
            let mut config = ContextConfig::default().with_max_history_messages(2);
            config.include_truncation_summary = false;
            let manager = ContextWindowManager::new(config);

            let context = manager.build_context(&preamble(), &create_messages(6, 5));

            assert_eq!(context.messages.len(), 4);
            assert!(!context.messages.iter().any(|m| m.content.contains("truncated")));
        }

        #[test]
        fn handles_empty_history() {
            let manager = ContextWindowManager::default();

            let context = manager.build_context(&preamble(), &[]);

            assert_eq!(context.messages.len(), 2);
            assert_eq!(context.truncated_count, 0);
            assert!(context.estimated_tokens > 0);
        }

        #[test]
        fn from_conversation_config_copies_limits() {
            let conversation = ConversationConfig {
                max_context_tokens: 5_000,
                reserved_for_response: 500,
                max_history_messages: Some(8),
                include_truncation_summary: false,
                fragment_buffer: 4,
            };
            let config = ContextConfig::from(&conversation);
            assert_eq!(config.budget.available_for_messages(), 4_500);
            assert_eq!(config.max_history_messages, Some(8));
            assert!(!config.include_truncation_summary);
        }
    }
}
