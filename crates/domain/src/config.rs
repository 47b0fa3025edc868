//! Configuration structures
//!
//! The collector consumes connection settings and an exclusion set; loading
//! them from the environment or a file is the infra crate's job.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_PORT, DEFAULT_USER};
use crate::types::ConnectionParams;

/// Top-level configuration for a statistics collector.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    /// Databases hidden from the database listing and the connection counts.
    pub exclude_dbs: BTreeSet<String>,
    pub connect_timeout_secs: Option<u64>,
    pub log: LogConfig,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: None,
            exclude_dbs: BTreeSet::new(),
            connect_timeout_secs: None,
            log: LogConfig::default(),
        }
    }
}

impl StatsConfig {
    /// Connection parameters for a session against `database`.
    pub fn connection_params(&self, database: &str) -> ConnectionParams {
        ConnectionParams {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: database.to_string(),
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Whether `database` is in the configured exclusion set.
    pub fn is_excluded(&self, database: &str) -> bool {
        self.exclude_dbs.contains(database)
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for StatsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("exclude_dbs", &self.exclude_dbs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("log", &self.log)
            .finish()
    }
}

/// Logging settings for the host process.
///
/// `level` accepts `DEBUG`, `INFO`, `WARN`, `ERROR`, `FATAL` and `UNKNOWN`.
/// `rotation` accepts `never`, `daily`, `hourly` and `minutely` and only
/// applies when `file` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path; standard output when absent.
    pub file: Option<PathBuf>,
    pub level: String,
    pub rotation: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { file: None, level: DEFAULT_LOG_LEVEL.to_string(), rotation: None }
    }
}
