//! Configuration validation utilities

use super::env::ENV_VAR_PATTERN;
use super::error::{ValidationError, ValidationErrorKind};
use super::schema::{CallSettings, LabConfig, ProviderSettings};
use url::Url;

/// Checks a loaded configuration before any provider is built
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate the whole configuration
    pub fn validate(&self, config: &LabConfig) -> Result<(), ValidationError> {
        self.validate_provider(&config.provider)?;
        self.validate_call(&config.call)?;
        Ok(())
    }

    /// Validate provider connection settings
    pub fn validate_provider(&self, provider: &ProviderSettings) -> Result<(), ValidationError> {
        let api_key = provider.api_key.expose_secret();
        if api_key.trim().is_empty() {
            return Err(ValidationError::missing("provider.api_key"));
        }
        if let Some(var) = self.extract_env_vars(api_key).into_iter().next() {
            return Err(ValidationError::new(
                "provider.api_key",
                ValidationErrorKind::Unresolved { var },
            ));
        }

        if provider.model.trim().is_empty() {
            return Err(ValidationError::missing("provider.model"));
        }

        let url = Url::parse(&provider.base_url)
            .map_err(|e| ValidationError::invalid_url("provider.base_url", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ValidationError::invalid_url(
                "provider.base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if provider.request_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "provider.request_timeout_secs",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Validate call settings
    pub fn validate_call(&self, call: &CallSettings) -> Result<(), ValidationError> {
        if call.backoff_ms > 60_000 {
            return Err(ValidationError::out_of_range(
                "call.backoff_ms",
                format!("{} exceeds the 60000ms maximum", call.backoff_ms),
            ));
        }
        Ok(())
    }

    /// Extract environment variables from a string
    pub fn extract_env_vars(&self, text: &str) -> Vec<String> {
        ENV_VAR_PATTERN
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}
