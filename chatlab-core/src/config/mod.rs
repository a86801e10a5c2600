//! Configuration module for chatlab
//!
//! Provider credentials and call defaults come either from `DEEPSEEK_*`
//! environment variables or from a YAML/JSON file with `${VAR}`
//! interpolation. Every path ends in `ConfigValidator`, so a missing key is
//! reported before any request is made.

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::{interpolate_env_vars, API_KEY_VAR, BASE_URL_VAR, MODEL_VAR};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{CallSettings, LabConfig, ProviderSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

fn read_interpolated(path: &Path) -> Result<String, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    env::interpolate_env_vars(&content)
}

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<LabConfig> {
    let path = path.as_ref();
    let interpolated = read_interpolated(path)?;

    let config: LabConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> ConfigResult<LabConfig> {
    let path = path.as_ref();
    let interpolated = read_interpolated(path)?;

    let config: LabConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}
