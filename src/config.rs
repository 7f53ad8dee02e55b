use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::feed::DEFAULT_FEED_CAPACITY;
use crate::gauntlet::GauntletOptions;
use crate::ArcadeError;

pub const BASE_URL_ENV: &str = "EVALFORGE_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "EVALFORGE_API_TIMEOUT_MS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcadeConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default = "default_feed_capacity")]
    pub feed_capacity: usize,
    #[serde(default)]
    pub gauntlet: GauntletOptions,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            feed_capacity: default_feed_capacity(),
            gauntlet: GauntletOptions::default(),
        }
    }
}

impl ArcadeConfig {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(BASE_URL_ENV) {
            if !value.trim().is_empty() {
                self.api.base_url = value.trim().to_string();
            }
        }

        if let Ok(value) = std::env::var(TIMEOUT_ENV) {
            match value.trim().parse::<u64>() {
                Ok(timeout_ms) => self.api.timeout_ms = timeout_ms,
                Err(error) => {
                    tracing::warn!("ignoring {TIMEOUT_ENV}='{value}': {error}");
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ArcadeError> {
        reqwest::Url::parse(self.api.base_url.trim()).map_err(|error| {
            ArcadeError::Config(format!(
                "invalid api baseUrl '{}': {error}",
                self.api.base_url
            ))
        })?;
        if self.api.timeout_ms == 0 {
            return Err(ArcadeError::Config(
                "api timeout must be greater than 0".to_string(),
            ));
        }
        if self.feed_capacity == 0 {
            return Err(ArcadeError::Config(
                "feed capacity must be greater than 0".to_string(),
            ));
        }
        if self.gauntlet.maintenance_threshold > self.gauntlet.struggle_threshold {
            return Err(ArcadeError::Config(
                "gauntlet maintenance threshold cannot exceed struggle threshold".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read the JSON config at `path` (defaults when it does not exist), then
/// apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<ArcadeConfig, ArcadeError> {
    let mut config = match path {
        Some(path) if path.exists() => {
            let raw = std::fs::read_to_string(path).map_err(|error| {
                ArcadeError::Config(format!("failed to read {}: {error}", path.display()))
            })?;
            serde_json::from_str::<ArcadeConfig>(&raw).map_err(|error| {
                ArcadeError::Config(format!(
                    "invalid configuration in {}: {error}",
                    path.display()
                ))
            })?
        }
        Some(path) => {
            tracing::debug!("config file {} not found, using defaults", path.display());
            ArcadeConfig::default()
        }
        None => ArcadeConfig::default(),
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_feed_capacity() -> usize {
    DEFAULT_FEED_CAPACITY
}
