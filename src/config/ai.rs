//! Model provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Model provider configuration
#[derive(Debug, Deserialize)]
pub struct AiConfig {
    /// Which provider adapter to construct at startup
    #[serde(default)]
    pub provider: AiProviderKind,

    /// API key for the OpenAI-compatible endpoint
    pub api_key: Option<Secret<String>>,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in a reply
    pub max_tokens: Option<u32>,
}

/// AI provider type
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderKind {
    /// Any endpoint speaking the OpenAI chat completions protocol
    OpenAI,
    /// Deterministic local provider, for development and tests
    #[default]
    Mock,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.provider == AiProviderKind::OpenAI {
            if !self.has_api_key() {
                return Err(ValidationError::MissingRequired("AI_API_KEY"));
            }
            if self.base_url.is_empty() {
                return Err(ValidationError::MissingRequired("AI_BASE_URL"));
            }
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProviderKind::default(),
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl Clone for AiConfig {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            api_key: self
                .api_key
                .as_ref()
                .map(|k| Secret::new(k.expose_secret().clone())),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_config_defaults() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProviderKind::Mock);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout_secs, 120);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AiConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_openai_requires_api_key() {
        let config = AiConfig {
            provider: AiProviderKind::OpenAI,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AiConfig {
            provider: AiProviderKind::OpenAI,
            api_key: Some(Secret::new(String::new())),
            ..Default::default()
        };
        assert!(!config.has_api_key());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_openai_with_key_is_valid() {
        let config = AiConfig {
            provider: AiProviderKind::OpenAI,
            api_key: Some(Secret::new("key-xxx".to_string())),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let config = AiConfig {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
