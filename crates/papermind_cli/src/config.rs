//! HTTP client settings loaded from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chat_provider_http::HttpProviderConfig;
use papermind_api::ApiConfig;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_PATH_ENV_VAR: &str = "PAPERMIND_CONFIG_PATH";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no client config given; pass --config or set {CONFIG_PATH_ENV_VAR}")]
    Missing,
    #[error("failed to read client config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse client config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid client config at {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Contents of the client config file.
///
/// ```json
/// {
///   "base_url": "http://127.0.0.1:8000",
///   "access_token": "<token>",
///   "timeout_sec": 30,
///   "idle_timeout_sec": 60,
///   "max_retries": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub timeout_sec: Option<u64>,
    #[serde(default)]
    pub idle_timeout_sec: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate(path)?;
        Ok(config)
    }

    /// Loads from `explicit`, falling back to [`CONFIG_PATH_ENV_VAR`].
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit.map(Path::to_path_buf).or_else(config_path_from_env) {
            Some(path) => Self::load(&path),
            None => Err(ConfigError::Missing),
        }
    }

    fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::Invalid {
            path: path.to_path_buf(),
            message: message.to_string(),
        };

        if self.base_url.trim().is_empty() {
            return Err(invalid("base_url must not be empty"));
        }
        if self.timeout_sec == Some(0) {
            return Err(invalid("timeout_sec must be > 0"));
        }
        if self.idle_timeout_sec == Some(0) {
            return Err(invalid("idle_timeout_sec must be > 0"));
        }
        Ok(())
    }

    fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn provider_config(&self) -> HttpProviderConfig {
        let mut config = HttpProviderConfig::new(self.base_url.trim());
        if let Some(token) = self.token() {
            config = config.with_access_token(token);
        }
        if let Some(timeout) = self.timeout_sec {
            config = config.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(idle) = self.idle_timeout_sec {
            config = config.with_idle_timeout(Duration::from_secs(idle));
        }
        if let Some(max_retries) = self.max_retries {
            config = config.with_max_retries(max_retries);
        }
        config
    }

    pub fn api_config(&self) -> ApiConfig {
        self.provider_config().to_api_config()
    }
}

pub fn config_path_from_env() -> Option<PathBuf> {
    papermind::config::env_string_opt(CONFIG_PATH_ENV_VAR).map(PathBuf::from)
}
