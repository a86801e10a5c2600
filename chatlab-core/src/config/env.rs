//! Environment variable handling for configuration

use super::error::ConfigError;
use super::schema::{LabConfig, ProviderSettings};
use super::secrets::SecretString;
use regex::Regex;
use std::env;
use std::sync::LazyLock;

/// Required API key variable
pub const API_KEY_VAR: &str = "DEEPSEEK_API_KEY";

/// Optional model override variable
pub const MODEL_VAR: &str = "DEEPSEEK_MODEL";

/// Optional base URL override variable
pub const BASE_URL_VAR: &str = "DEEPSEEK_BASE_URL";

pub(crate) static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid env var pattern"));

/// Interpolate `${VAR}` references in a configuration string
pub fn interpolate_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();
    let mut missing_vars = Vec::new();

    for cap in ENV_VAR_PATTERN.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];

        match env::var(var_name) {
            Ok(value) => {
                result = result.replace(full_match, &value);
            }
            Err(_) => {
                missing_vars.push(var_name.to_string());
            }
        }
    }

    // Report the first missing variable
    if let Some(var) = missing_vars.into_iter().next() {
        return Err(ConfigError::EnvVarNotFound { var });
    }

    Ok(result)
}

/// Read a variable, treating blank values as unset
fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl ProviderSettings {
    /// Read provider settings from `DEEPSEEK_*` environment variables.
    ///
    /// The API key is required; model and base URL fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = non_blank_var(API_KEY_VAR).ok_or_else(|| ConfigError::EnvVarNotFound {
            var: API_KEY_VAR.to_string(),
        })?;

        let mut settings = ProviderSettings::new(SecretString::new(api_key));
        if let Some(model) = non_blank_var(MODEL_VAR) {
            settings = settings.with_model(model);
        }
        if let Some(base_url) = non_blank_var(BASE_URL_VAR) {
            settings = settings.with_base_url(base_url);
        }
        Ok(settings)
    }
}

impl LabConfig {
    /// Provider settings from the environment with default call settings
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = LabConfig {
            provider: ProviderSettings::from_env()?,
            call: Default::default(),
        };
        super::ConfigValidator::new().validate(&config)?;
        Ok(config)
    }
}
