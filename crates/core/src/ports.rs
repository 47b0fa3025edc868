//! Ports between the collection engine and the database boundary.
//!
//! The infra crate implements [`SessionFactory`] and [`DatabaseSession`] on
//! top of a PostgreSQL client; tests implement them in memory.
//!
//! # Example
//!
//! ```no_run
//! use pgstats_core::QueryExecutor;
//!
//! fn count_backends(executor: &mut dyn QueryExecutor) -> pgstats_domain::Result<usize> {
//!     let rows = executor.run_query("postgres", "SELECT pid FROM pg_stat_activity", &[])?;
//!     Ok(rows.len())
//! }
//! ```

use pgstats_domain::{ConnectionParams, Result, Row};

/// One open session bound to a single database.
pub trait DatabaseSession: Send {
    /// Database this session was opened against.
    fn database(&self) -> &str;

    /// Execute a read-only statement and materialize every row.
    ///
    /// `params` are bound positionally as text (`$1`, `$2`, ...); identifiers
    /// and literals are never spliced into `sql`.
    fn query(&mut self, sql: &str, params: &[&str]) -> Result<Vec<Row>>;

    /// Whether the underlying connection is known to be gone.
    fn is_closed(&self) -> bool;

    /// Terminate the session.
    fn close(self: Box<Self>) -> Result<()>;
}

/// Opens sessions. Failures are reported as `StatsError::Connection`.
pub trait SessionFactory: Send + Sync {
    fn open(&self, params: &ConnectionParams) -> Result<Box<dyn DatabaseSession>>;
}

/// Runs a statement against a named database.
///
/// Every metric handler is written against this trait only.
pub trait QueryExecutor {
    fn run_query(&mut self, database: &str, sql: &str, params: &[&str]) -> Result<Vec<Row>>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &mut E {
    fn run_query(&mut self, database: &str, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        (**self).run_query(database, sql, params)
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for Box<E> {
    fn run_query(&mut self, database: &str, sql: &str, params: &[&str]) -> Result<Vec<Row>> {
        (**self).run_query(database, sql, params)
    }
}
