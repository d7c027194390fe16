//! Application configuration structures

use serde::{Deserialize, Serialize};

use crate::constants::STORE_NAME;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
}

/// Local draft store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

/// Remote synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the remote bookkeeping API
    pub base_url: String,
    /// Interval between sync polls, in seconds
    pub interval_seconds: u64,
    /// Whether background sync is enabled
    pub enabled: bool,
    /// Timeout for individual API requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Bearer token for the remote API, if configured
    #[serde(default)]
    pub api_token: Option<String>,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig { path: format!("{STORE_NAME}.db"), pool_size: 4 },
            sync: SyncConfig {
                base_url: "http://localhost:3000/api".to_string(),
                interval_seconds: 60,
                enabled: false,
                request_timeout_seconds: default_request_timeout(),
                api_token: None,
            },
        }
    }
}
