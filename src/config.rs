//! Configuration loaded from a TOML file.
//!
//! Every section and key is optional; a missing file means all defaults.

use chrono::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "taco-cloud.toml";

const DEFAULT_SESSION_TTL_MINUTES: i64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("session_ttl_minutes must be a positive number of minutes, got {0}")]
    InvalidSessionTtl(i64),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, e.g. "127.0.0.1:8080"
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// Insert the default ingredients on startup
    pub seed_ingredients: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("taco-cloud.db"),
            seed_ingredients: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub bcrypt_cost: u32,
    pub session_ttl_minutes: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let minutes = self.security.session_ttl_minutes;
        if minutes <= 0 || Duration::try_minutes(minutes).is_none() {
            return Err(ConfigError::InvalidSessionTtl(minutes));
        }
        Ok(())
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Config::default());
        }
        Self::load(path)
    }

    /// Session lifetime; falls back to the default for values [`Config::validate`] rejects.
    pub fn session_ttl(&self) -> Duration {
        Duration::try_minutes(self.security.session_ttl_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .unwrap_or_else(|| Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}
