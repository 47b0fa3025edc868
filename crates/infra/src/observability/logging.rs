//! Logging setup, powered by tracing-subscriber
//!
//! Settings come from [`LogConfig`]. Anything that cannot be honoured (an
//! unknown level or rotation, a path without a file name, a directory that
//! cannot be created) switches the whole setup to stdout at `INFO`, and the
//! problem is reported through the freshly installed subscriber.

use std::path::{Path, PathBuf};

use pgstats_domain::{LogConfig, Result, StatsError};
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

/// A log setting that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogSettingsError {
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),
    #[error("unknown log rotation '{0}'")]
    UnknownRotation(String),
    #[error("log path '{0}' has no file name")]
    MissingFileName(PathBuf),
    #[error("cannot open log file in '{path}': {reason}")]
    FileUnavailable { path: PathBuf, reason: String },
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    File { directory: PathBuf, file_name: String, rotation: Rotation },
}

/// Settings after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPlan {
    pub level: LevelFilter,
    pub target: LogTarget,
    /// Problems that forced the stdout/`INFO` fallback.
    pub problems: Vec<LogSettingsError>,
}

impl LogPlan {
    fn fallback(problems: Vec<LogSettingsError>) -> Self {
        Self { level: LevelFilter::INFO, target: LogTarget::Stdout, problems }
    }
}

/// Keeps the background log writer alive; dropping it flushes pending lines.
#[derive(Debug)]
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Map a configured level name onto a filter.
///
/// `FATAL` has no tracing counterpart and maps to `ERROR`; `UNKNOWN` lets
/// everything through.
pub fn parse_level(level: &str) -> std::result::Result<LevelFilter, LogSettingsError> {
    match level.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => Ok(LevelFilter::DEBUG),
        "INFO" => Ok(LevelFilter::INFO),
        "WARN" | "WARNING" => Ok(LevelFilter::WARN),
        "ERROR" | "FATAL" => Ok(LevelFilter::ERROR),
        "UNKNOWN" => Ok(LevelFilter::TRACE),
        _ => Err(LogSettingsError::UnknownLevel(level.to_string())),
    }
}

pub fn parse_rotation(rotation: &str) -> std::result::Result<Rotation, LogSettingsError> {
    match rotation.trim().to_ascii_lowercase().as_str() {
        "never" => Ok(Rotation::NEVER),
        "daily" => Ok(Rotation::DAILY),
        "hourly" => Ok(Rotation::HOURLY),
        "minutely" => Ok(Rotation::MINUTELY),
        _ => Err(LogSettingsError::UnknownRotation(rotation.to_string())),
    }
}

/// Validate `config` without touching the filesystem or the global
/// subscriber.
pub fn resolve(config: &LogConfig) -> LogPlan {
    let mut problems = Vec::new();

    let level = parse_level(&config.level).map_err(|e| problems.push(e)).ok();
    let rotation = match config.rotation.as_deref() {
        Some(rotation) => parse_rotation(rotation).map_err(|e| problems.push(e)).ok(),
        None => Some(Rotation::NEVER),
    };
    let target = match &config.file {
        None => Some(LogTarget::Stdout),
        Some(path) => split_log_path(path).map_err(|e| problems.push(e)).ok().and_then(
            |(directory, file_name)| {
                rotation.clone().map(|rotation| LogTarget::File { directory, file_name, rotation })
            },
        ),
    };

    match (level, target) {
        (Some(level), Some(target)) if problems.is_empty() => {
            LogPlan { level, target, problems }
        }
        _ => LogPlan::fallback(problems),
    }
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard that must be held for as long as logging is needed.
///
/// # Errors
/// Returns `StatsError::Config` when a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard> {
    let mut plan = resolve(config);

    let (writer, worker) = match open_target(&plan.target) {
        Ok(Some(appender)) => tracing_appender::non_blocking(appender),
        Ok(None) => tracing_appender::non_blocking(std::io::stdout()),
        Err(problem) => {
            plan = LogPlan::fallback(vec![problem]);
            tracing_appender::non_blocking(std::io::stdout())
        }
    };

    let filter = EnvFilter::try_new(plan.level.to_string())
        .map_err(|e| StatsError::Config(format!("Invalid tracing filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true)
        .with_ansi(matches!(plan.target, LogTarget::Stdout))
        .try_init()
        .map_err(|e| StatsError::Config(format!("Failed to install log subscriber: {e}")))?;

    for problem in &plan.problems {
        tracing::warn!(
            error = %problem,
            "Caught a problem with log settings; logging to stdout at INFO"
        );
    }
    tracing::debug!(level = %plan.level, output = ?plan.target, "logging initialised");

    Ok(LoggingGuard { _worker: worker })
}

fn split_log_path(path: &Path) -> std::result::Result<(PathBuf, String), LogSettingsError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LogSettingsError::MissingFileName(path.to_path_buf()))?;

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((directory, file_name.to_string()))
}

fn open_target(
    target: &LogTarget,
) -> std::result::Result<Option<RollingFileAppender>, LogSettingsError> {
    match target {
        LogTarget::Stdout => Ok(None),
        LogTarget::File { directory, file_name, rotation } => RollingFileAppender::builder()
            .rotation(rotation.clone())
            .filename_prefix(file_name)
            .build(directory)
            .map(Some)
            .map_err(|e| LogSettingsError::FileUnavailable {
                path: directory.clone(),
                reason: e.to_string(),
            }),
    }
}
