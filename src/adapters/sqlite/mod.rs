//! SQLite adapters.
//!
//! Persistent implementations of the repository ports backed by a single
//! SQLite database file.

mod document_repository;
mod history_store;
pub(crate) mod pool;
mod session_repository;

pub use document_repository::SqliteDocumentRepository;
pub use history_store::SqliteHistoryStore;
pub use pool::{connect, initialize_schema};
pub use session_repository::{SqliteThreadRepository, SqliteUserRepository};
