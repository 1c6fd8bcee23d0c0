//! Application configuration stored in `{data_dir}/config.yaml`.
//!
//! ```yaml
//! api_url: http://localhost:8000
//! request_timeout_secs: 120
//! default_days: 252
//! default_simulations: 1000
//! ```
//!
//! Every field is optional. The service URL is resolved as `--api-url`, then
//! `STOCKSIM_API_URL`, then the file, then the built-in default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stocksim_core::SimulationParameters;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
/// Environment variable overriding the configured service URL
pub const API_URL_ENV: &str = "STOCKSIM_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    pub default_days: u32,
    pub default_simulations: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        let params = SimulationParameters::default();
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: None,
            default_days: params.days(),
            default_simulations: params.simulations(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_saphyr::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read `config.yaml` from the data directory. A missing file is not an error.
    pub fn read(data_dir: &Path) -> Result<Self, ConfigError> {
        let path = data_dir.join(CONFIG_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => Self::from_yaml(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::Io {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Like [`read`](Self::read), but falls back to defaults with a logged warning.
    pub fn load(data_dir: &Path) -> Self {
        match Self::read(data_dir) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Using default configuration");
                Self::default()
            }
        }
    }

    /// Apply the environment and command-line overrides for the service URL.
    pub fn with_overrides(mut self, env_url: Option<String>, cli_url: Option<String>) -> Self {
        if let Some(url) = cli_url.or(env_url).filter(|url| !url.trim().is_empty()) {
            self.api_url = url;
        }
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Starting parameters for a session. Out-of-range values are skipped with a warning.
    pub fn parameters(&self) -> SimulationParameters {
        let mut params = SimulationParameters::default();
        if let Err(e) = params.set_days(self.default_days) {
            tracing::warn!(error = %e, "Ignoring configured default_days");
        }
        if let Err(e) = params.set_simulations(self.default_simulations) {
            tracing::warn!(error = %e, "Ignoring configured default_simulations");
        }
        params
    }
}
