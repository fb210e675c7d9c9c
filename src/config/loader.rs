//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

pub const BASE_URL_ENV_VAR: &str = "YAYA_BASE_URL";
pub const API_KEY_ENV_VAR: &str = "YAYA_API_KEY";
pub const API_SECRET_ENV_VAR: &str = "YAYA_API_SECRET";
pub const ALLOWED_ORIGINS_ENV_VAR: &str = "ALLOWED_ORIGINS";
pub const PORT_ENV_VAR: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment values onto a config.
///
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(BASE_URL_ENV_VAR) {
        config.upstream.base_url = url;
    }
    if let Some(key) = lookup(API_KEY_ENV_VAR) {
        config.upstream.api_key = Some(key);
    }
    if let Some(secret) = lookup(API_SECRET_ENV_VAR) {
        config.upstream.api_secret = Some(secret);
    }
    if let Some(origins) = lookup(ALLOWED_ORIGINS_ENV_VAR) {
        config.cors.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(port) = lookup(PORT_ENV_VAR) {
        config.listener.port = port.trim().parse().map_err(|_| ConfigError::Env {
            name: PORT_ENV_VAR,
            value: port.clone(),
        })?;
    }
    Ok(())
}

/// Load a `.env` file from the working directory or a parent into the
/// process environment.
///
/// Variables already set in the environment win. A missing file is not an
/// error; a malformed one is.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Load configuration: optional TOML file, then environment, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
