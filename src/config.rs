//! Configuration management for adminctl
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main configuration structure for adminctl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Where the login session is persisted
    #[serde(default)]
    pub session: SessionConfig,

    /// Video catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Payment analytics settings
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `https://api.example.com`
    ///
    /// There is no sensible default; a missing value is reported by
    /// [`Config::validate`] before any command runs.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Storage backend for the token and role
    #[serde(default)]
    pub backend: SessionBackend,

    /// Session file location for the `file` backend
    ///
    /// Defaults to `session.json` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Session storage backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionBackend {
    /// JSON file in the user's data directory
    #[default]
    File,
    /// OS credential store
    Keyring,
    /// Process memory only; forgotten on exit
    Memory,
}

impl std::str::FromStr for SessionBackend {
    type Err = AdminError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(AdminError::Config(format!(
                "Invalid session backend: {}. Must be one of: file, keyring, memory",
                other
            ))),
        }
    }
}

/// Video catalog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Page size used when fetching a whole video list
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,
}

fn default_list_limit() -> u32 {
    1000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            list_limit: default_list_limit(),
        }
    }
}

/// Payment analytics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Monthly subscription price used for revenue estimates
    #[serde(default = "default_monthly_price")]
    pub monthly_price: u64,
}

fn default_monthly_price() -> u64 {
    499
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            monthly_price: default_monthly_price(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AdminError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| AdminError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("ADMINCTL_API_URL") {
            if !base_url.trim().is_empty() {
                self.api.base_url = Some(base_url);
            }
        }

        if let Ok(timeout) = std::env::var("ADMINCTL_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.api.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid ADMINCTL_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(backend) = std::env::var("ADMINCTL_SESSION_BACKEND") {
            match backend.parse() {
                Ok(value) => {
                    self.session.backend = value;
                    tracing::debug!(backend = %backend, "Env override: ADMINCTL_SESSION_BACKEND");
                }
                Err(_) => tracing::warn!("Invalid ADMINCTL_SESSION_BACKEND: {}", backend),
            }
        }

        if let Ok(path) = std::env::var("ADMINCTL_SESSION_PATH") {
            self.session.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.api_url {
            self.api.base_url = Some(base_url.clone());
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// A missing or malformed API base URL is a startup misconfiguration and
    /// is reported here rather than on the first request.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;

        if self.api.timeout_seconds == 0 {
            return Err(
                AdminError::Config("api.timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.catalog.list_limit == 0 {
            return Err(
                AdminError::Config("catalog.list_limit must be greater than 0".to_string()).into(),
            );
        }

        Ok(())
    }

    /// The parsed backend base URL
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Config` when the URL is absent, unparseable or
    /// not http(s)
    pub fn base_url(&self) -> Result<Url> {
        let raw = self
            .api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AdminError::Config(
                    "api.base_url is required (set it in the config file or ADMINCTL_API_URL)"
                        .to_string(),
                )
            })?;

        let url = Url::parse(raw)
            .map_err(|e| AdminError::Config(format!("Invalid api.base_url '{}': {}", raw, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(AdminError::Config(format!(
                "Invalid api.base_url scheme: {}. Must be http or https",
                scheme
            ))
            .into()),
        }
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }
}
