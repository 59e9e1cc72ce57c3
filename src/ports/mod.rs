//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Streaming chat completions
//! - `DocumentRepository`, `FileStorage`, `TextExtractor` - Uploaded PDFs
//! - `UserRepository`, `ThreadRepository` - Session store
//! - `HistoryStore` - Per-thread message history
//! - `SessionValidator`, `SessionIssuer` - Cookie session tokens

mod ai_provider;
mod document_repository;
mod file_storage;
mod history_store;
mod repository_error;
mod session_store;
mod session_validator;
mod text_extractor;

pub use ai_provider::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo,
    RequestMetadata, StreamChunk, TokenUsage,
};
pub use document_repository::DocumentRepository;
pub use file_storage::{FileStorage, FileStorageError, StoredFile};
pub use history_store::{HistoryPage, HistoryStore};
pub use repository_error::RepositoryError;
pub use session_store::{ThreadRepository, UserRepository};
pub use session_validator::{IssuedToken, SessionIssuer, SessionValidator};
pub use text_extractor::{ExtractionError, TextExtractor};
