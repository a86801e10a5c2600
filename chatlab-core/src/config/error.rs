//! Configuration errors

use thiserror::Error;

/// Failure to produce a usable configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config from '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in '{path}' at line {}, column {}: {message}",
            .line.unwrap_or(0), .column.unwrap_or(0))]
    ParseError {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Environment variable '{var}' not found")]
    EnvVarNotFound { var: String },
}

/// A single field that failed validation
#[derive(Debug, Error)]
#[error("'{field}' {kind}")]
pub struct ValidationError {
    /// Dotted path of the field, e.g. `provider.base_url`
    pub field: &'static str,
    pub kind: ValidationErrorKind,
}

/// What was wrong with the field
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("is required")]
    Missing,

    #[error("references unset environment variable '{var}'")]
    Unresolved { var: String },

    #[error("is out of range: {message}")]
    OutOfRange { message: String },

    #[error("is not a usable URL: {message}")]
    InvalidUrl { message: String },
}

impl ValidationError {
    pub fn new(field: &'static str, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }

    pub fn missing(field: &'static str) -> Self {
        Self::new(field, ValidationErrorKind::Missing)
    }

    pub fn out_of_range(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::OutOfRange {
                message: message.into(),
            },
        )
    }

    pub fn invalid_url(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            field,
            ValidationErrorKind::InvalidUrl {
                message: message.into(),
            },
        )
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
