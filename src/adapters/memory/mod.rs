//! In-memory adapters for tests and local development.

mod files;
mod repositories;

pub use files::{InMemoryFileStorage, Utf8TextExtractor};
pub use repositories::{
    InMemoryDocumentRepository, InMemoryHistoryStore, InMemoryThreadRepository,
    InMemoryUserRepository,
};
