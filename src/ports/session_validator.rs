//! Session token ports.
//!
//! The browser holds an opaque token in the `auth_token` cookie. These
//! ports turn a user id into such a token and back again, keeping the
//! token format out of the HTTP layer.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId};

/// Validates session tokens and extracts user identity.
///
/// # Contract
///
/// Implementations must:
/// - Validate the token signature
/// - Validate the expiry claim
/// - Return `AuthError::InvalidToken` for malformed/bad signature tokens
/// - Return `AuthError::TokenExpired` for expired tokens
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token and return the authenticated user.
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}

/// A freshly issued session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Encoded token, ready for the cookie value.
    pub token: String,
    /// When the token stops validating.
    pub expires_at: Timestamp,
}

/// Issues session tokens for users.
pub trait SessionIssuer: Send + Sync {
    /// Issue a token identifying `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<IssuedToken, AuthError>;
}
