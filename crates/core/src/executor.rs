//! Query executor backed by the connection manager.

use std::time::Instant;

use pgstats_domain::{Result, Row, StatsConfig, StatsError};
use tracing::{debug, instrument};

use crate::connection::ConnectionManager;
use crate::ports::{QueryExecutor, SessionFactory};

/// Runs each statement on the manager's session for the requested database,
/// reconnecting only when the database changes.
///
/// Result sets are fully materialized before returning; statistics results
/// are bounded by the number of tables or databases.
#[derive(Debug)]
pub struct SessionQueryExecutor<F> {
    connections: ConnectionManager<F>,
}

impl<F: SessionFactory> SessionQueryExecutor<F> {
    pub fn new(factory: F, config: StatsConfig) -> Self {
        Self { connections: ConnectionManager::new(factory, config) }
    }

    pub fn from_manager(connections: ConnectionManager<F>) -> Self {
        Self { connections }
    }

    pub fn connections(&self) -> &ConnectionManager<F> {
        &self.connections
    }

    pub fn connections_mut(&mut self) -> &mut ConnectionManager<F> {
        &mut self.connections
    }
}

impl<F: SessionFactory> QueryExecutor for SessionQueryExecutor<F> {
    #[instrument(level = "trace", skip(self, sql, params))]
    fn run_query(&mut self, database: &str, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        let session = self.connections.session_for(database)?;

        let started = Instant::now();
        // A session that drops mid-statement is a query failure, not a
        // connection failure: the session existed when the statement started.
        let rows = session.query(sql, params).map_err(|err| match err {
            StatsError::Connection(message) => StatsError::Query(message),
            other => other,
        })?;

        debug!(
            database,
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query executed"
        );
        Ok(rows)
    }
}
