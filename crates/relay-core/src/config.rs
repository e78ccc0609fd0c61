//! Cache, transport and logging configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::endpoint::Endpoint;

/// Errors raised while loading or writing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse JSON config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Mock transport settings.
    #[serde(default)]
    pub transport: TransportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Load config from a TOML or JSON file, chosen by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: display,
                source,
            })
        } else {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: display,
                source,
            })
        }
    }

    /// Render the config as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false the client runs without a cache and every call hits the transport.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

/// Mock transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Simulated latency per call, in milliseconds.
    #[serde(default)]
    pub latency_ms: u64,

    /// Transactions per page for `paginatedTransactions`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Endpoints that always fail.
    #[serde(default)]
    pub fail_endpoints: Vec<Endpoint>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            page_size: default_page_size(),
            fail_endpoints: Vec::new(),
        }
    }
}

fn default_page_size() -> usize {
    5
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (for development).
    #[default]
    Human,
    /// JSON format (for log aggregation).
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
