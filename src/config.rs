//! Configuration management for Meal Finder
//!
//! This module provides unified configuration management with automatic
//! first-run initialization, multi-source loading, and zero-config defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::{ClientConfig, SearchConfig, SortKey};
use crate::constants::{api, env, favorites, http, limits, search};
use crate::errors::{AppError, ConfigError, Result};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Recipe API client settings
    pub client: ClientConfigToml,
    /// Search coordinator settings
    pub search: SearchConfigToml,
    /// Favorites storage settings
    pub favorites: FavoritesConfigToml,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// API base URL, without the key segment
    pub base_url: String,
    /// API key (overridden by MEAL_FINDER_API_KEY)
    pub api_key: String,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout in seconds (None = no timeout)
    pub pool_idle_timeout_secs: Option<u64>,
    /// Maximum connections per host
    pub pool_max_per_host: usize,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            api_key: api::DEFAULT_API_KEY.to_string(),
            tcp_nodelay: true,
            pool_idle_timeout_secs: Some(http::POOL_IDLE_TIMEOUT.as_secs()),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

/// TOML-friendly search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfigToml {
    /// Debounce window for repeated queries in milliseconds
    pub debounce_ms: u64,
    /// Concurrent lookups during enrichment and random fan-out
    pub enrichment_concurrency: usize,
    /// Random meals fetched by default
    pub random_count: usize,
    /// Initial result ordering
    pub default_sort: SortKey,
}

impl Default for SearchConfigToml {
    fn default() -> Self {
        Self {
            debounce_ms: search::DEBOUNCE_WINDOW.as_millis() as u64,
            enrichment_concurrency: search::ENRICHMENT_CONCURRENCY,
            random_count: search::DEFAULT_RANDOM_COUNT,
            default_sort: SortKey::Insertion,
        }
    }
}

/// TOML-friendly favorites configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FavoritesConfigToml {
    /// SQLite database file (empty = user data directory)
    pub database: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level for the application
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Convert TOML-friendly configuration to runtime configuration
    pub fn to_runtime_config(&self) -> (ClientConfig, SearchConfig, PathBuf) {
        (
            self.client.to_runtime_config(),
            self.search.to_runtime_config(),
            self.favorites.database_path(),
        )
    }

    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// CLI flags are applied by the caller on top of the result.
    pub async fn load(config_file_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::default();

        let config_path = match config_file_override {
            Some(ref path) => Some(path.clone()),
            None => Self::find_config_file()?,
        };

        if let Some(path) = config_path {
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                config = Self::load_from_file(&path).await?;
            } else if config_file_override.is_some() {
                return Err(ConfigError::NotFound { path }.into());
            }
        }

        config.apply_api_key_override(std::env::var(env::API_KEY).ok());
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail later at runtime
    pub fn validate(&self) -> Result<()> {
        if self.client.rate_limit_rps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.rate_limit_rps".to_string(),
                value: "0".to_string(),
                reason: "Rate limit must be at least one request per second".to_string(),
            }
            .into());
        }

        if self.client.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "client.api_key".to_string(),
            }
            .into());
        }

        self.search
            .to_runtime_config()
            .validate()
            .map_err(|reason| ConfigError::InvalidValue {
                field: "search".to_string(),
                value: format!(
                    "enrichment_concurrency={}, random_count={}",
                    self.search.enrichment_concurrency, self.search.random_count
                ),
                reason,
            })?;

        Ok(())
    }

    /// Initialize configuration on first run
    ///
    /// Creates a default config file if none exists and notifies the user
    pub async fn initialize_first_run() -> Result<Option<PathBuf>> {
        let config_path = Self::get_default_config_path()?;

        if config_path.exists() {
            return Ok(Some(config_path));
        }

        info!("Creating default configuration file...");

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::generic(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(&config_path, Self::generate_default_config_content())
            .await
            .map_err(|e| {
                AppError::generic(format!(
                    "Failed to write config file {}: {}",
                    config_path.display(),
                    e
                ))
            })?;

        eprintln!("Created default configuration file:");
        eprintln!("   {}", config_path.display());
        eprintln!();

        Ok(Some(config_path))
    }

    /// Replace the API key when a non-blank override is given
    fn apply_api_key_override(&mut self, key: Option<String>) {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            debug!("Using API key from {}", env::API_KEY);
            self.client.api_key = key.trim().to_string();
        }
    }

    /// Find configuration file in standard locations
    fn find_config_file() -> Result<Option<PathBuf>> {
        let search_paths = vec![
            PathBuf::from("./meal-finder.toml"),
            PathBuf::from("./config.toml"),
            Self::get_default_config_path()?,
        ];

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Ok(Some(path));
            }
        }

        debug!("No config file found in standard locations");
        Ok(None)
    }

    /// Get the default config file path for the current user
    fn get_default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AppError::generic("Could not determine user config directory"))?;

        Ok(config_dir.join(favorites::APP_DIR).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::generic(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::from)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate default configuration content with helpful comments
    fn generate_default_config_content() -> String {
        format!(
            r#"# Meal Finder Configuration
# This file was automatically generated on first run.

[client]
base_url = "{}"
# API key; the MEAL_FINDER_API_KEY environment variable takes precedence
api_key = "{}"
tcp_nodelay = true
pool_idle_timeout_secs = {}
pool_max_per_host = {}
request_timeout_secs = {}
connect_timeout_secs = {}
rate_limit_rps = {}

[search]
# Identical queries repeated within this window are ignored
debounce_ms = {}
enrichment_concurrency = {}
random_count = {}
# insertion, name-asc, name-desc, category, area, favorites-first
default_sort = "insertion"

[favorites]
# SQLite database file (empty = user data directory)
database = ""

[logging]
level = "warn"  # error, warn, info, debug, trace
"#,
            api::BASE_URL,
            api::DEFAULT_API_KEY,
            http::POOL_IDLE_TIMEOUT.as_secs(),
            http::POOL_MAX_PER_HOST,
            http::DEFAULT_TIMEOUT.as_secs(),
            http::CONNECT_TIMEOUT.as_secs(),
            limits::DEFAULT_RATE_LIMIT_RPS,
            search::DEBOUNCE_WINDOW.as_millis(),
            search::ENRICHMENT_CONCURRENCY,
            search::DEFAULT_RANDOM_COUNT,
        )
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            tcp_nodelay: self.tcp_nodelay,
            pool_idle_timeout: self.pool_idle_timeout_secs.map(Duration::from_secs),
            pool_max_per_host: self.pool_max_per_host,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            rate_limit_rps: self.rate_limit_rps,
        }
    }
}

impl SearchConfigToml {
    /// Convert to runtime SearchConfig
    pub fn to_runtime_config(&self) -> SearchConfig {
        SearchConfig {
            debounce_window: Duration::from_millis(self.debounce_ms),
            max_concurrent_requests: self.enrichment_concurrency,
            random_count: self.random_count,
            default_sort: self.default_sort,
        }
    }
}

impl FavoritesConfigToml {
    /// Resolve the database file, defaulting to the user data directory
    pub fn database_path(&self) -> PathBuf {
        if !self.database.as_os_str().is_empty() {
            return self.database.clone();
        }

        dirs::data_dir()
            .map(|dir| dir.join(favorites::APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(favorites::DATABASE_FILE)
    }
}
