//! Authentication types for the domain layer.
//!
//! An `AuthenticatedUser` is what the session token resolves to. The token
//! format lives behind the `SessionValidator` port, so nothing here knows
//! about JWTs or cookies.

use super::UserId;
use thiserror::Error;

/// User resolved from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The opaque user identifier carried in the token.
    pub id: UserId,
}

impl AuthenticatedUser {
    /// Creates a new authenticated user.
    pub fn new(id: UserId) -> Self {
        Self { id }
    }
}

/// Authentication errors that can occur during token handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Could not validate token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,

    /// The token could not be produced.
    #[error("Token issuance failed: {0}")]
    IssuanceFailed(String),
}

impl AuthError {
    /// Returns true if this error indicates the client should drop its cookie.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}
