//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool size must be between 1 and 100")]
    InvalidPoolSize,

    #[error("Session secret must be at least {0} characters in production")]
    SessionSecretTooShort(usize),

    #[error("Token lifetime must be at least one day")]
    InvalidTokenTtl,

    #[error("Invalid model temperature (expected 0.0 to 2.0)")]
    InvalidTemperature,

    #[error("Response reservation must be smaller than the context budget")]
    InvalidContextBudget,

    #[error("Fragment buffer must hold at least one fragment")]
    InvalidFragmentBuffer,

    #[error("History message cap must be at least one")]
    InvalidHistoryLimit,

    #[error("Maximum upload size must be positive")]
    InvalidUploadLimit,
}
