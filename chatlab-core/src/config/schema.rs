//! Configuration schema structures with serde support

use super::secrets::SecretString;
use crate::providers::CallOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com";

/// Root configuration for a lab program
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LabConfig {
    /// Chat provider connection
    pub provider: ProviderSettings,

    /// Default retry/timeout behavior for calls
    #[serde(default)]
    pub call: CallSettings,
}

/// Connection settings for an OpenAI-compatible chat provider
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// API key (supports environment variable interpolation)
    pub api_key: SecretString,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for the provider API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl ProviderSettings {
    /// Settings for `api_key` with default model and endpoint
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            model: default_model(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request HTTP timeout
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

/// Retry and timeout defaults, in config-friendly units
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CallSettings {
    /// Retries after the first attempt (negative means none)
    #[serde(default)]
    pub retry_count: i32,

    /// Whole-call timeout in milliseconds (0 = none)
    #[serde(default)]
    pub timeout_ms: u64,

    /// Linear backoff step in milliseconds
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            retry_count: 0,
            timeout_ms: 0,
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl CallSettings {
    /// Build call options from these settings
    pub fn to_call_options(&self) -> CallOptions {
        CallOptions::default()
            .with_retry_count(self.retry_count)
            .with_timeout(Duration::from_millis(self.timeout_ms))
            .with_backoff_step(Duration::from_millis(self.backoff_ms))
    }
}

// Default value functions
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_request_timeout() -> u64 {
    60
}
fn default_backoff_ms() -> u64 {
    250
}
