//! Database-scoped handlers and cluster-wide listings.

use std::collections::{BTreeMap, BTreeSet};

use pgstats_domain::constants::MAINTENANCE_DATABASE;
use pgstats_domain::{AggregateMetricResult, FieldValue, MetricValue, Result, Row, StatsError};
use tracing::trace;

use super::reshape::{count_value, single_value};
use super::{queries, AggregateMetricHandler, CollectionContext};
use crate::ports::QueryExecutor;

/// A single-row statement filtered by `datname = $1`.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseStatQuery {
    pub sql: &'static str,
    pub value_column: &'static str,
}

impl DatabaseStatQuery {
    pub const fn new(sql: &'static str, value_column: &'static str) -> Self {
        Self { sql, value_column }
    }
}

impl AggregateMetricHandler for DatabaseStatQuery {
    fn collect(
        &self,
        executor: &mut dyn QueryExecutor,
        ctx: &CollectionContext<'_>,
    ) -> Result<MetricValue> {
        let rows = executor.run_query(ctx.database, self.sql, &[ctx.database])?;
        single_value(&rows, self.value_column, ctx.as_float)
    }
}

pub static BLOCKS_FETCHED: DatabaseStatQuery =
    DatabaseStatQuery::new(queries::DB_BLOCKS_FETCHED, "pg_stat_get_db_blocks_fetched");
pub static BLOCKS_HIT: DatabaseStatQuery =
    DatabaseStatQuery::new(queries::DB_BLOCKS_HIT, "pg_stat_get_db_blocks_hit");
pub static COMMITS: DatabaseStatQuery =
    DatabaseStatQuery::new(queries::DB_COMMITS, "pg_stat_get_db_xact_commit");
pub static ROLLBACKS: DatabaseStatQuery =
    DatabaseStatQuery::new(queries::DB_ROLLBACKS, "pg_stat_get_db_xact_rollback");
pub static INSERTS: DatabaseStatQuery =
    DatabaseStatQuery::new(queries::DB_TUPLES_INSERTED, "pg_stat_get_db_tuples_inserted");
pub static UPDATES: DatabaseStatQuery =
    DatabaseStatQuery::new(queries::DB_TUPLES_UPDATED, "pg_stat_get_db_tuples_updated");
pub static DELETES: DatabaseStatQuery =
    DatabaseStatQuery::new(queries::DB_TUPLES_DELETED, "pg_stat_get_db_tuples_deleted");

/// Number of locks held in the database on non-system relations.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockCount;

pub static LOCKS: LockCount = LockCount;

impl AggregateMetricHandler for LockCount {
    fn collect(
        &self,
        executor: &mut dyn QueryExecutor,
        ctx: &CollectionContext<'_>,
    ) -> Result<MetricValue> {
        let rows = lock_rows(executor, ctx.database)?;
        Ok(count_value(rows.len(), ctx.as_float))
    }
}

/// Client connections to the database, `0` when it has none or is excluded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionCount;

pub static CONNECTIONS: ConnectionCount = ConnectionCount;

impl AggregateMetricHandler for ConnectionCount {
    fn collect(
        &self,
        executor: &mut dyn QueryExecutor,
        ctx: &CollectionContext<'_>,
    ) -> Result<MetricValue> {
        match connections_per_database(executor, ctx.exclude_dbs, Some(ctx.database))? {
            AggregateMetricResult::Scalar(MetricValue::Integer(count)) => {
                Ok(MetricValue::from_integer(count, ctx.as_float))
            }
            other => Err(StatsError::Query(format!(
                "connection count for '{}' produced {other:?}",
                ctx.database
            ))),
        }
    }
}

/// Lock rows (`pid, virtualxid, datname, relname, locktype, mode`) for
/// `database`, excluding system relations.
pub fn lock_rows(executor: &mut dyn QueryExecutor, database: &str) -> Result<Vec<Row>> {
    executor.run_query(database, queries::LOCKS, &[database])
}

/// Backend counts per database from `pg_stat_activity`, minus excluded
/// databases.
///
/// With `database` set, collapses to that database's count (`0` when absent).
/// Backends without a database (background workers) are not counted.
pub fn connections_per_database(
    executor: &mut dyn QueryExecutor,
    exclude_dbs: &BTreeSet<String>,
    database: Option<&str>,
) -> Result<AggregateMetricResult> {
    let rows = executor.run_query(MAINTENANCE_DATABASE, queries::CONNECTIONS_PER_DATABASE, &[])?;

    let mut counts = BTreeMap::new();
    for row in &rows {
        let name = match row.require("datname")? {
            FieldValue::Text(name) => name,
            FieldValue::Null => {
                trace!("skipping backends without a database");
                continue;
            }
            other => {
                return Err(StatsError::Query(format!("unexpected datname value {other:?}")))
            }
        };
        if exclude_dbs.contains(name) {
            continue;
        }
        counts.insert(name.clone(), row.require("count")?.to_i64()?);
    }

    Ok(match database {
        Some(database) => AggregateMetricResult::Scalar(MetricValue::Integer(
            counts.get(database).copied().unwrap_or(0),
        )),
        None => AggregateMetricResult::PerDatabase(counts),
    })
}

/// Every database in the cluster, including those whose owner no longer
/// resolves to a user, minus the excluded ones. Keeps the query's ordering.
pub fn list_databases(
    executor: &mut dyn QueryExecutor,
    exclude_dbs: &BTreeSet<String>,
) -> Result<Vec<String>> {
    let rows = executor.run_query(MAINTENANCE_DATABASE, queries::LIST_DATABASES, &[])?;

    let mut databases = Vec::with_capacity(rows.len());
    for row in &rows {
        match row.require("Database")? {
            FieldValue::Text(name) if exclude_dbs.contains(name) => {}
            FieldValue::Text(name) => databases.push(name.clone()),
            other => {
                return Err(StatsError::Query(format!("unexpected database name {other:?}")))
            }
        }
    }

    Ok(databases)
}
