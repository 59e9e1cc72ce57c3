//! HS256 JWT session tokens.
//!
//! Tokens carry two claims: `user` (the opaque user id) and `exp` (Unix
//! seconds). The same secret signs and verifies, so one value implements
//! both `SessionIssuer` and `SessionValidator`.
//!
//! # Example
//!
//! ```ignore
//! let tokens = JwtSessionTokens::new(&secret, Duration::from_secs(30 * 24 * 3600));
//! let issued = tokens.issue(&user_id)?;
//! let user = tokens.validate(&issued.token).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, AuthenticatedUser, Timestamp, UserId};
use crate::ports::{IssuedToken, SessionIssuer, SessionValidator};

/// Claims stored in the `auth_token` cookie.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// Opaque user id.
    user: String,
    /// Expiry timestamp (Unix epoch seconds).
    exp: i64,
}

/// Issues and validates HS256 session tokens.
#[derive(Clone)]
pub struct JwtSessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtSessionTokens {
    /// Creates a token service signing with `secret`.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;
        validation
    }
}

impl std::fmt::Debug for JwtSessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionTokens")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionIssuer for JwtSessionTokens {
    fn issue(&self, user_id: &UserId) -> Result<IssuedToken, AuthError> {
        let expires_at = Timestamp::now().plus_secs(self.ttl.as_secs());
        let claims = SessionClaims {
            user: user_id.as_str().to_string(),
            exp: expires_at.as_unix_secs(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::IssuanceFailed(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

#[async_trait]
impl SessionValidator for JwtSessionTokens {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Self::validation())
            .map_err(|e| {
                use jsonwebtoken::errors::ErrorKind;
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    _ => {
                        tracing::debug!(error = %e, "Session token rejected");
                        AuthError::InvalidToken
                    }
                }
            })?;

        let user_id = UserId::new(data.claims.user).map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthenticatedUser::new(user_id))
    }
}
