//! Configuration loader
//!
//! Loads collector configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `PGSTATS_HOST` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PGSTATS_HOST`: Server host (required)
//! - `PGSTATS_PORT`: Server port
//! - `PGSTATS_USER`: Role to connect as
//! - `PGSTATS_PASSWORD`: Password for that role
//! - `PGSTATS_EXCLUDE_DBS`: Comma-separated databases to hide
//! - `PGSTATS_CONNECT_TIMEOUT`: Connect timeout in seconds
//! - `PGSTATS_LOG_FILE`: Log file path (stdout when unset)
//! - `PGSTATS_LOG_LEVEL`: `DEBUG`, `INFO`, `WARN`, `ERROR`, `FATAL` or `UNKNOWN`
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./pgstats.json` or `./pgstats.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pgstats_domain::{Result, StatsConfig, StatsError};

const CONFIG_FILE_NAMES: [&str; 4] = ["pgstats.json", "pgstats.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `StatsError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value cannot be parsed
pub fn load() -> Result<StatsConfig> {
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
/// Only `PGSTATS_HOST` is required; every other setting keeps its default
/// when unset.
///
/// # Errors
/// Returns `StatsError::Config` if `PGSTATS_HOST` is missing or a value
/// cannot be parsed.
pub fn load_from_env() -> Result<StatsConfig> {
    let mut config = StatsConfig { host: env_var("PGSTATS_HOST")?, ..StatsConfig::default() };

    if let Some(port) = env_opt("PGSTATS_PORT") {
        config.port = port
            .parse::<u16>()
            .map_err(|e| StatsError::Config(format!("Invalid port '{port}': {e}")))?;
    }
    if let Some(user) = env_opt("PGSTATS_USER") {
        config.user = user;
    }
    config.password = env_opt("PGSTATS_PASSWORD");
    if let Some(list) = env_opt("PGSTATS_EXCLUDE_DBS") {
        config.exclude_dbs = parse_database_list(&list);
    }
    if let Some(timeout) = env_opt("PGSTATS_CONNECT_TIMEOUT") {
        let seconds = timeout
            .parse::<u64>()
            .map_err(|e| StatsError::Config(format!("Invalid connect timeout '{timeout}': {e}")))?;
        config.connect_timeout_secs = Some(seconds);
    }
    config.log.file = env_opt("PGSTATS_LOG_FILE").map(PathBuf::from);
    if let Some(level) = env_opt("PGSTATS_LOG_LEVEL") {
        config.log.level = level;
    }

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `StatsError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<StatsConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(StatsError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            StatsError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| StatsError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<StatsConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| StatsError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| StatsError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(StatsError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent and grandparent, then
/// the executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Split a comma-separated database list, dropping blanks.
fn parse_database_list(list: &str) -> BTreeSet<String> {
    list.split(',').map(str::trim).filter(|name| !name.is_empty()).map(String::from).collect()
}

/// Get required environment variable
///
/// # Errors
/// Returns `StatsError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| StatsError::Config(format!("Missing required environment variable: {key}")))
}

/// Optional environment variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
