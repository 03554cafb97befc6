//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_BASE_URL;
use crate::feed::FeedConfig;
use crate::pagination::{DEFAULT_DEBOUNCE_MS, DEFAULT_PAGE_SIZE};
use crate::session::FileStorage;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub messages: MessagesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Where the CLI persists its session keys
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Defaults to the platform data directory
    pub file: Option<String>,
}

impl SessionConfig {
    pub fn path(&self) -> PathBuf {
        self.file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(FileStorage::default_path)
    }
}

/// Message history paging
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl MessagesConfig {
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            page_size: self.page_size.max(1),
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("troika").join("config.toml")),
            Some(PathBuf::from("./troika.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any `TROIKA_*` variable lookup
    pub fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("TROIKA_API_URL") {
            self.api.base_url = url;
        }

        if let Some(file) = var("TROIKA_SESSION_FILE") {
            self.session.file = Some(file);
        }

        if let Some(size) = var("TROIKA_PAGE_SIZE") {
            match size.parse() {
                Ok(size) => self.messages.page_size = size,
                Err(_) => tracing::warn!(value = %size, "Ignoring invalid TROIKA_PAGE_SIZE"),
            }
        }
        if let Some(ms) = var("TROIKA_DEBOUNCE_MS") {
            match ms.parse() {
                Ok(ms) => self.messages.debounce_ms = ms,
                Err(_) => tracing::warn!(value = %ms, "Ignoring invalid TROIKA_DEBOUNCE_MS"),
            }
        }

        if let Some(level) = var("TROIKA_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TROIKA_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Troika Configuration
#
# Environment variables override these settings:
# - TROIKA_API_URL
# - TROIKA_SESSION_FILE
# - TROIKA_PAGE_SIZE
# - TROIKA_DEBOUNCE_MS
# - TROIKA_LOG_LEVEL
# - TROIKA_LOG_FORMAT

[api]
# Backend base URL
base_url = "https://api.0804.in/api"

[session]
# Session key file (defaults to ~/.local/share/troika/session.json)
# file = "/home/me/.troika-session.json"

[messages]
# Messages per history page
page_size = 10

# Quiet time before a filter or page change is fetched (ms)
debounce_ms = 300

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.0804.in/api");
        assert_eq!(config.messages.page_size, 10);
        assert_eq!(config.messages.feed_config().debounce, Duration::from_millis(300));
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.messages.debounce_ms, 300);
        assert!(config.session.file.is_none());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("troika.toml");
        std::fs::write(&path, "[messages]\npage_size = 25\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.messages.page_size, 25);
        assert_eq!(config.messages.debounce_ms, 300);
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("troika.toml");
        std::fs::write(&path, "[messages\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TROIKA_API_URL", "http://localhost:4000/api"),
            ("TROIKA_SESSION_FILE", "/tmp/s.json"),
            ("TROIKA_PAGE_SIZE", "nope"),
            ("TROIKA_DEBOUNCE_MS", "50"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://localhost:4000/api");
        assert_eq!(config.session.path(), PathBuf::from("/tmp/s.json"));
        assert_eq!(config.messages.page_size, 10);
        assert_eq!(config.messages.debounce_ms, 50);
    }
}
