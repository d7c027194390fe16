//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `OPENBOOKS_DB_PATH`: Database file path
//! - `OPENBOOKS_DB_POOL_SIZE`: Connection pool size
//! - `OPENBOOKS_SYNC_BASE_URL`: Remote API base URL
//! - `OPENBOOKS_SYNC_INTERVAL`: Sync interval in seconds
//! - `OPENBOOKS_SYNC_ENABLED`: Whether sync is enabled (true/false)
//! - `OPENBOOKS_SYNC_TIMEOUT`: Per-request timeout in seconds (optional)
//! - `OPENBOOKS_API_TOKEN`: Bearer token for the remote API (optional)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./openbooks.json` or `./openbooks.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use openbooks_domain::{BooksError, Config, DatabaseConfig, Result, SyncConfig};

/// Load configuration with automatic fallback strategy
///
/// Reads `.env` if present, then attempts environment variables, then falls
/// back to a config file.
///
/// # Errors
/// Returns `BooksError::Config` if configuration cannot be loaded from
/// either source.
pub fn load() -> Result<Config> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// All required environment variables must be present. Returns an error
/// if any are missing.
///
/// # Errors
/// Returns `BooksError::Config` if required variables are missing or have
/// invalid values.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("OPENBOOKS_DB_PATH")?;
    let db_pool_size = env_var("OPENBOOKS_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| BooksError::Config(format!("Invalid pool size: {}", e)))
    })?;

    let sync_base_url = env_var("OPENBOOKS_SYNC_BASE_URL")?;
    let sync_interval = env_var("OPENBOOKS_SYNC_INTERVAL").and_then(|s| {
        s.parse::<u64>().map_err(|e| BooksError::Config(format!("Invalid sync interval: {}", e)))
    })?;
    let sync_enabled = env_bool("OPENBOOKS_SYNC_ENABLED", true);
    let request_timeout_seconds = match std::env::var("OPENBOOKS_SYNC_TIMEOUT") {
        Ok(raw) => raw
            .parse::<u64>()
            .map_err(|e| BooksError::Config(format!("Invalid sync timeout: {}", e)))?,
        Err(_) => 30,
    };
    let api_token = std::env::var("OPENBOOKS_API_TOKEN").ok();

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        sync: SyncConfig {
            base_url: sync_base_url,
            interval_seconds: sync_interval,
            enabled: sync_enabled,
            request_timeout_seconds,
            api_token,
        },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `BooksError::Config` if the file is missing, no candidate is
/// found, or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(BooksError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            BooksError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| BooksError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| BooksError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| BooksError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(BooksError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(vec![
            cwd.join("config.json"),
            cwd.join("config.toml"),
            cwd.join("openbooks.json"),
            cwd.join("openbooks.toml"),
            cwd.join("../config.json"),
            cwd.join("../config.toml"),
        ]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(vec![
                exe_dir.join("config.json"),
                exe_dir.join("config.toml"),
                exe_dir.join("openbooks.json"),
                exe_dir.join("openbooks.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| BooksError::Config(format!("Missing required environment variable: {}", key)))
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
