//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Writes (`/query`, `/upload`, session bootstrap) and reads (documents,
//! threads) get separate handlers.

mod context_assembler;
mod conversation_engine;
pub mod handlers;

pub use context_assembler::{ContextAssembler, ContextError};
pub use conversation_engine::{ConversationEngine, ConversationError, EngineSettings, FragmentStream};
pub use handlers::{
    BootstrapSessionHandler, DocumentQueryHandler, SubmitQueryHandler, ThreadQueryHandler,
    UploadDocumentHandler,
};
