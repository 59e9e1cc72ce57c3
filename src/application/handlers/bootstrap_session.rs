//! BootstrapSessionHandler - first contact from a browser.
//!
//! Without a session the caller gets a fresh user and a token to store in
//! the cookie. With a valid session the caller is told whether they already
//! have threads.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId};
use crate::domain::user::User;
use crate::ports::{IssuedToken, RepositoryError, SessionIssuer, ThreadRepository, UserRepository};

/// Which kind of visitor this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NewUser,
    ExistingUser,
    ExistingUserWithThreads,
}

impl SessionStatus {
    /// Human-readable status returned to the client.
    pub fn message(&self) -> &'static str {
        match self {
            SessionStatus::NewUser => "New user created",
            SessionStatus::ExistingUser => "Existing user",
            SessionStatus::ExistingUserWithThreads => "Existing user with threads",
        }
    }
}

/// Result of bootstrapping.
#[derive(Debug, Clone)]
pub struct BootstrapSessionResult {
    pub user_id: UserId,
    pub status: SessionStatus,
    /// Present only when a new user was created.
    pub token: Option<IssuedToken>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Token(#[from] AuthError),

    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

/// Handler for `GET /`.
pub struct BootstrapSessionHandler {
    users: Arc<dyn UserRepository>,
    threads: Arc<dyn ThreadRepository>,
    issuer: Arc<dyn SessionIssuer>,
}

impl BootstrapSessionHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        threads: Arc<dyn ThreadRepository>,
        issuer: Arc<dyn SessionIssuer>,
    ) -> Self {
        Self {
            users,
            threads,
            issuer,
        }
    }

    pub async fn handle(
        &self,
        current: Option<AuthenticatedUser>,
    ) -> Result<BootstrapSessionResult, SessionError> {
        match current {
            Some(user) => self.existing(user.id).await,
            None => self.register().await,
        }
    }

    async fn register(&self) -> Result<BootstrapSessionResult, SessionError> {
        let user = User::register();
        self.users.create(&user).await?;
        let token = self.issuer.issue(&user.id)?;

        tracing::info!(user_id = %user.id, "New user created");
        Ok(BootstrapSessionResult {
            user_id: user.id,
            status: SessionStatus::NewUser,
            token: Some(token),
        })
    }

    async fn existing(&self, user_id: UserId) -> Result<BootstrapSessionResult, SessionError> {
        if !self.users.exists(&user_id).await? {
            // Valid token for a user the store has not seen, e.g. after a
            // database reset. Re-register under the same id.
            self.users
                .create(&User {
                    id: user_id.clone(),
                    created_at: Timestamp::now(),
                })
                .await?;
        }

        let has_threads = !self.threads.list_for_owner(&user_id).await?.is_empty();
        let status = if has_threads {
            SessionStatus::ExistingUserWithThreads
        } else {
            SessionStatus::ExistingUser
        };

        Ok(BootstrapSessionResult {
            user_id,
            status,
            token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::JwtSessionTokens;
    use crate::adapters::memory::{InMemoryThreadRepository, InMemoryUserRepository};
    use crate::domain::foundation::DocumentId;
    use crate::domain::thread::Thread;
    use crate::ports::SessionValidator;
    use std::time::Duration;

    struct Fixture {
        users: InMemoryUserRepository,
        threads: InMemoryThreadRepository,
        tokens: JwtSessionTokens,
        handler: BootstrapSessionHandler,
    }

    fn fixture() -> Fixture {
        let users = InMemoryUserRepository::new();
        let threads = InMemoryThreadRepository::new();
        let tokens = JwtSessionTokens::new("bootstrap-test-secret", Duration::from_secs(60));
        let handler = BootstrapSessionHandler::new(
            Arc::new(users.clone()),
            Arc::new(threads.clone()),
            Arc::new(tokens.clone()),
        );
        Fixture {
            users,
            threads,
            tokens,
            handler,
        }
    }

    #[tokio::test]
    async fn anonymous_visitor_gets_new_user_and_token() {
        let fx = fixture();

        let result = fx.handler.handle(None).await.unwrap();

        assert_eq!(result.status, SessionStatus::NewUser);
        assert_eq!(result.user_id.as_str().len(), 32);
        assert!(fx.users.exists(&result.user_id).await.unwrap());
        let token = result.token.unwrap();
        let validated = fx.tokens.validate(&token.token).await.unwrap();
        assert_eq!(validated.id, result.user_id);
    }

    #[tokio::test]
    async fn returning_user_without_threads() {
        let fx = fixture();
        let first = fx.handler.handle(None).await.unwrap();

        let again = fx
            .handler
            .handle(Some(AuthenticatedUser::new(first.user_id.clone())))
            .await
            .unwrap();

        assert_eq!(again.status, SessionStatus::ExistingUser);
        assert_eq!(again.user_id, first.user_id);
        assert!(again.token.is_none());
    }

    #[tokio::test]
    async fn returning_user_with_threads() {
        let fx = fixture();
        let first = fx.handler.handle(None).await.unwrap();
        fx.threads
            .create(&Thread::start(first.user_id.clone(), DocumentId::new(1)))
            .await
            .unwrap();

        let again = fx
            .handler
            .handle(Some(AuthenticatedUser::new(first.user_id)))
            .await
            .unwrap();

        assert_eq!(again.status, SessionStatus::ExistingUserWithThreads);
        assert_eq!(again.status.message(), "Existing user with threads");
    }

    #[tokio::test]
    async fn unknown_but_valid_user_is_re_registered() {
        let fx = fixture();
        let ghost = UserId::new("ghost").unwrap();

        let result = fx
            .handler
            .handle(Some(AuthenticatedUser::new(ghost.clone())))
            .await
            .unwrap();

        assert_eq!(result.status, SessionStatus::ExistingUser);
        assert!(fx.users.exists(&ghost).await.unwrap());
    }
}
