//! Session store ports: users and the threads they own.

use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::foundation::{ThreadId, UserId};
use crate::domain::thread::Thread;
use crate::domain::user::User;

/// Persistence for anonymous users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Save a new user.
    async fn create(&self, user: &User) -> Result<(), RepositoryError>;

    /// Returns true if the user has been recorded.
    async fn exists(&self, id: &UserId) -> Result<bool, RepositoryError>;
}

/// Persistence for conversation threads.
#[async_trait]
pub trait ThreadRepository: Send + Sync {
    /// Save a new thread.
    async fn create(&self, thread: &Thread) -> Result<(), RepositoryError>;

    /// Find a thread by id.
    ///
    /// Returns `None` if not found.
    async fn find(&self, id: &ThreadId) -> Result<Option<Thread>, RepositoryError>;

    /// Threads owned by `owner`, newest first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Thread>, RepositoryError>;
}
