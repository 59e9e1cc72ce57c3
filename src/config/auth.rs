//! Session cookie configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Shortest session secret accepted in production.
const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Session token configuration (HS256-signed `auth_token` cookie)
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign session tokens
    #[serde(default = "default_session_secret")]
    pub session_secret: Secret<String>,

    /// Token and cookie lifetime in days
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u64,

    /// Set the `Secure` attribute on the session cookie
    #[serde(default)]
    pub cookie_secure: bool,
}

impl AuthConfig {
    /// Get token lifetime as Duration
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_days * 24 * 60 * 60)
    }

    /// Validate session configuration
    ///
    /// Any non-empty secret is accepted outside production.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let secret = self.session_secret.expose_secret();
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("SESSION_SECRET"));
        }
        if *environment == Environment::Production && secret.len() < MIN_PRODUCTION_SECRET_LEN {
            return Err(ValidationError::SessionSecretTooShort(
                MIN_PRODUCTION_SECRET_LEN,
            ));
        }
        if self.token_ttl_days == 0 {
            return Err(ValidationError::InvalidTokenTtl);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: default_session_secret(),
            token_ttl_days: default_token_ttl_days(),
            cookie_secure: false,
        }
    }
}

impl Clone for AuthConfig {
    fn clone(&self) -> Self {
        Self {
            session_secret: Secret::new(self.session_secret.expose_secret().clone()),
            token_ttl_days: self.token_ttl_days,
            cookie_secure: self.cookie_secure,
        }
    }
}

fn default_session_secret() -> Secret<String> {
    Secret::new("secret".to_string())
}

fn default_token_ttl_days() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthConfig::default();
        assert_eq!(config.token_ttl_days, 30);
        assert!(!config.cookie_secure);
        assert_eq!(config.token_ttl(), Duration::from_secs(30 * 86_400));
    }

    #[test]
    fn test_default_secret_allowed_in_development() {
        let config = AuthConfig::default();
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_short_secret_rejected_in_production() {
        let config = AuthConfig::default();
        assert!(matches!(
            config.validate(&Environment::Production),
            Err(ValidationError::SessionSecretTooShort(32))
        ));
    }

    #[test]
    fn test_long_secret_accepted_in_production() {
        let config = AuthConfig {
            session_secret: Secret::new("x".repeat(48)),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Production).is_ok());
    }

    #[test]
    fn test_validation_empty_secret() {
        let config = AuthConfig {
            session_secret: Secret::new(String::new()),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }

    #[test]
    fn test_validation_zero_ttl() {
        let config = AuthConfig {
            token_ttl_days: 0,
            ..Default::default()
        };
        assert!(config.validate(&Environment::Development).is_err());
    }
}
