//! Provider error types and handling

use std::time::Duration;
use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when calling a chat model
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider returned an error
    #[error("Provider error: {code}: {message}")]
    ProviderError { code: String, message: String },

    /// The HTTP client gave up on a single request
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response parsing error
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Insufficient quota
    #[error("Insufficient quota: {0}")]
    InsufficientQuota(String),

    /// Service unavailable
    #[error("Service temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    /// Configuration error or empty required input
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The caller's cancellation scope was cancelled
    #[error("Call cancelled")]
    Cancelled,

    /// The per-call time budget ran out
    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(Duration),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// How the retrying caller treats an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Fails fast, never retried
    Configuration,
    /// Retried up to the configured bound
    Transient,
    /// Never retried, surfaced immediately
    Cancellation,
}

impl ProviderError {
    /// Classify this error for retry decisions
    pub fn class(&self) -> ErrorClass {
        match self {
            ProviderError::Configuration(_) => ErrorClass::Configuration,
            ProviderError::Cancelled | ProviderError::DeadlineExceeded(_) => {
                ErrorClass::Cancellation
            }
            _ => ErrorClass::Transient,
        }
    }

    /// Whether another attempt may be made after this error
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Whether the call gave up because of cancellation or its deadline
    pub fn is_cancellation(&self) -> bool {
        self.class() == ErrorClass::Cancellation
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_connect() {
            ProviderError::Network(format!("Connection failed: {}", err))
        } else if err.is_status() {
            if let Some(status) = err.status() {
                match status.as_u16() {
                    401 => ProviderError::Authentication(err.to_string()),
                    429 => ProviderError::RateLimit {
                        message: "Too many requests".to_string(),
                        retry_after_secs: None,
                    },
                    500..=599 => ProviderError::ServiceUnavailable(err.to_string()),
                    _ => ProviderError::ProviderError {
                        code: status.to_string(),
                        message: err.to_string(),
                    },
                }
            } else {
                ProviderError::Other(err.to_string())
            }
        } else if err.is_decode() {
            ProviderError::ParseError(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::ParseError(err.to_string())
    }
}
