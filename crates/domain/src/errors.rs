//! Error types used throughout pgstats

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for pgstats
///
/// Collection failures are never masked: a handler either returns a complete
/// result or one of these variants, and the caller decides whether to skip
/// the metric, abort the cycle, or retry on the next poll.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum StatsError {
    /// A session for the target database could not be opened or reused.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A statement failed once a session existed, or its result did not have
    /// the expected shape.
    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StatsError {
    /// Stable label suitable for structured logging fields.
    pub fn label(&self) -> &'static str {
        match self {
            StatsError::Connection(_) => "connection",
            StatsError::Query(_) => "query",
            StatsError::Config(_) => "config",
            StatsError::UnknownMetric(_) => "unknown_metric",
            StatsError::InvalidInput(_) => "invalid_input",
        }
    }
}

/// Result type alias for pgstats operations
pub type Result<T> = std::result::Result<T, StatsError>;
