//! Gateway configuration
//!
//! Loaded once from a JSON file at start-up and shared read-only (`Arc`)
//! for the lifetime of the process.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Root configuration for the CTP gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Broker (futures company) id
    #[serde(default)]
    pub broker_id: String,

    /// Trading account; also used as the investor id on every wire record
    #[serde(default)]
    pub user_id: String,

    #[serde(default)]
    pub password: String,

    /// Terminal authentication code issued by the broker
    #[serde(default)]
    pub auth_code: String,

    #[serde(default)]
    pub app_id: String,

    #[serde(default)]
    pub product_info: String,

    /// Broker front address, e.g. `tcp://180.168.146.187:10130`
    #[serde(default)]
    pub front_addr: String,

    /// Client endpoint
    #[serde(default)]
    pub listen: ListenConfig,

    /// Age after which an unanswered order query is given up (0 disables)
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    #[serde(default = "default_eviction_interval_ms")]
    pub eviction_interval_ms: u64,

    /// Drop pending orders and queries when the broker session is lost
    #[serde(default = "default_clear_on_disconnect")]
    pub clear_on_disconnect: bool,

    /// Capacity of the notification and client command channels
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_query_timeout_secs() -> u64 {
    30
}

fn default_eviction_interval_ms() -> u64 {
    1000
}

fn default_clear_on_disconnect() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            broker_id: String::new(),
            user_id: String::new(),
            password: String::new(),
            auth_code: String::new(),
            app_id: String::new(),
            product_info: String::new(),
            front_addr: String::new(),
            listen: ListenConfig::default(),
            query_timeout_secs: default_query_timeout_secs(),
            eviction_interval_ms: default_eviction_interval_ms(),
            clear_on_disconnect: default_clear_on_disconnect(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the fields the broker session cannot work without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broker_id.is_empty() {
            return Err(ConfigError::Invalid("broker_id is empty".to_string()));
        }
        if self.user_id.is_empty() {
            return Err(ConfigError::Invalid("user_id is empty".to_string()));
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::Invalid("channel_capacity must be > 0".to_string()));
        }
        if self.query_timeout_secs > 0 && self.eviction_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "eviction_interval_ms must be > 0 when query_timeout_secs is set".to_string(),
            ));
        }
        Ok(())
    }

    /// Query timeout, `None` when eviction is disabled
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_secs > 0).then(|| Duration::from_secs(self.query_timeout_secs))
    }

    pub fn eviction_interval(&self) -> Duration {
        Duration::from_millis(self.eviction_interval_ms.max(1))
    }
}

/// Client listen endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    6001
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ListenConfig {
    /// `host:port` form accepted by socket binders
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
