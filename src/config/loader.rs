//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, ServiceRole};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the weather provider secret.
pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

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

/// Load configuration for `role` from an optional TOML file, apply
/// environment overrides, and validate the result.
pub fn load_config(path: Option<&Path>, role: ServiceRole) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config, role).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay values supplied through the environment. Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(key) = get(WEATHER_API_KEY_ENV) {
        config.providers.weather_api_key = key;
    }
    if let Some(url) = get("INTERNAL_BASE_URL") {
        config.edge.internal_base_url = url;
    }
    if let Some(url) = get("POSTAL_BASE_URL") {
        config.providers.postal_base_url = url;
    }
    if let Some(url) = get("WEATHER_BASE_URL") {
        config.providers.weather_base_url = url;
    }
}
