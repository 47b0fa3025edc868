//! # pgstats Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - PostgreSQL sessions over the blocking `postgres` client
//! - Configuration loading (environment, JSON, TOML)
//! - Logging setup (`tracing-subscriber`, `tracing-appender`)
//! - Driver error conversions
//!
//! ## Architecture
//! - Implements traits defined in `pgstats-core`
//! - Contains all "impure" code (sockets, files, global subscriber)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;

use pgstats_core::{SessionQueryExecutor, StatsService};
use pgstats_domain::constants::MAINTENANCE_DATABASE;
use pgstats_domain::{Result, StatsConfig};

// Re-export commonly used items
pub use database::{PostgresSession, PostgresSessionFactory};
pub use observability::init_logging;

/// Statistics service over real PostgreSQL sessions.
pub type PostgresStatsService = StatsService<SessionQueryExecutor<PostgresSessionFactory>>;

/// Build a service for `config` and verify the server is reachable.
///
/// The first session is opened against the maintenance database, which the
/// listing and connection-count metrics use anyway.
///
/// # Errors
/// Returns `StatsError::Connection` when the server cannot be reached or
/// rejects the credentials.
pub fn connect(config: StatsConfig) -> Result<PostgresStatsService> {
    let exclude_dbs = config.exclude_dbs.clone();
    let mut executor = SessionQueryExecutor::new(PostgresSessionFactory::new(), config);
    executor.connections_mut().connect(MAINTENANCE_DATABASE)?;

    tracing::info!(excluded = exclude_dbs.len(), "statistics service ready");
    Ok(StatsService::new(executor, exclude_dbs))
}
