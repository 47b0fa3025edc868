//! Metric handlers.
//!
//! Each catalog entry points at a handler implementing one of the two traits
//! below. Most handlers are declarative (a statement plus the column holding
//! the value) and share the reshaping helpers in [`reshape`]; the row
//! estimate, lock count and connection count carry their own logic.

use std::collections::BTreeSet;

use pgstats_domain::{MetricValue, Result, TableMetricResult};

use crate::ports::QueryExecutor;

pub mod aggregate;
pub mod queries;
pub mod reshape;
pub mod table;

pub use aggregate::{
    connections_per_database, list_databases, lock_rows, ConnectionCount, DatabaseStatQuery,
    LockCount,
};
pub use table::{
    estimate_row_count, estimated_rows_for_table, list_tables, EstimatedRows, TableColumnQuery,
};

/// Inputs shared by every handler invocation.
#[derive(Debug, Clone, Copy)]
pub struct CollectionContext<'a> {
    /// Database the metric is collected for.
    pub database: &'a str,
    /// Databases hidden from cluster-wide listings.
    pub exclude_dbs: &'a BTreeSet<String>,
    /// Report values as floating point rather than integers.
    pub as_float: bool,
}

/// Produces one value per table of `ctx.database`.
pub trait TableMetricHandler: Send + Sync {
    fn collect(
        &self,
        executor: &mut dyn QueryExecutor,
        ctx: &CollectionContext<'_>,
    ) -> Result<TableMetricResult>;
}

/// Produces a single value for `ctx.database`.
pub trait AggregateMetricHandler: Send + Sync {
    fn collect(
        &self,
        executor: &mut dyn QueryExecutor,
        ctx: &CollectionContext<'_>,
    ) -> Result<MetricValue>;
}
