//! Conversation domain module.
//!
//! Pure pieces of the turn protocol: message types, per-turn assembly of
//! the model input, and the history window applied before each call.

mod assembler;
mod context;
mod message;

pub use assembler::{assemble, document_message, AssembledTurn, Turn, ASSISTANT_INSTRUCTION};
pub use context::{BuiltContext, ContextConfig, ContextWindowManager, TokenBudget};
pub use message::{ChatMessage, MessageRole, StoredMessage};
