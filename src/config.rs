/// Application configuration
///
/// Read from `config.toml` in the user's config directory:
/// - Linux: ~/.config/shipyard-admin/config.toml
/// - macOS: ~/Library/Application Support/shipyard-admin/config.toml
/// - Windows: %APPDATA%\shipyard-admin\config.toml
///
/// Every key is optional. `SHIPYARD_API_URL` overrides the base URL.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

const APP_DIR: &str = "shipyard-admin";
const API_URL_ENV: &str = "SHIPYARD_API_URL";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the ERP back end; `/api/...` is appended to it
    pub api_base_url: String,
    /// SQLite file holding the persisted session
    pub storage_path: PathBuf,
    /// How long a feedback banner stays up
    pub banner_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            storage_path: default_storage_path(),
            banner_timeout_secs: 3,
        }
    }
}

impl AppConfig {
    /// Load the config file if there is one, then apply the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Replace the base URL when an override is set and not blank
    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    pub fn banner_timeout(&self) -> Duration {
        Duration::from_secs(self.banner_timeout_secs)
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_default()
        .join(APP_DIR)
        .join("session.db")
}
