//! Error type shared by the persistence ports.

use thiserror::Error;

/// Repository error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
}

impl RepositoryError {
    /// Creates a database error from any displayable cause.
    pub fn database(cause: impl std::fmt::Display) -> Self {
        Self::Database(cause.to_string())
    }
}
