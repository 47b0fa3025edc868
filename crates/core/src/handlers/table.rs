//! Table-scoped handlers.

use pgstats_domain::constants::PAGE_SIZE_BYTES;
use pgstats_domain::{FieldValue, MetricValue, Result, StatsError, TableMetricResult};
use tracing::debug;

use super::reshape::reshape_by_table;
use super::{queries, CollectionContext, TableMetricHandler};
use crate::ports::QueryExecutor;

/// A statement returning `(table name, value)` rows.
#[derive(Debug, Clone, Copy)]
pub struct TableColumnQuery {
    pub sql: &'static str,
    pub table_column: &'static str,
    pub value_column: &'static str,
}

impl TableColumnQuery {
    pub const fn new(
        sql: &'static str,
        table_column: &'static str,
        value_column: &'static str,
    ) -> Self {
        Self { sql, table_column, value_column }
    }
}

impl TableMetricHandler for TableColumnQuery {
    fn collect(
        &self,
        executor: &mut dyn QueryExecutor,
        ctx: &CollectionContext<'_>,
    ) -> Result<TableMetricResult> {
        let rows = executor.run_query(ctx.database, self.sql, &[])?;
        reshape_by_table(&rows, self.table_column, self.value_column, ctx.as_float)
    }
}

pub static TABLE_SIZE: TableColumnQuery =
    TableColumnQuery::new(queries::TABLE_SIZES, "table_name", "size");
pub static INDEX_SIZE: TableColumnQuery =
    TableColumnQuery::new(queries::INDEX_SIZES, "table_name", "size");
pub static DEAD: TableColumnQuery =
    TableColumnQuery::new(queries::DEAD_TUPLES, "relname", "pg_stat_get_dead_tuples");
pub static LAST_VACUUM: TableColumnQuery =
    TableColumnQuery::new(queries::LAST_AUTOVACUUM, "tname", "ltime");

pub static INSERTS: TableColumnQuery =
    TableColumnQuery::new(queries::TUPLES_INSERTED, "relname", "pg_stat_get_tuples_inserted");
pub static UPDATES: TableColumnQuery =
    TableColumnQuery::new(queries::TUPLES_UPDATED, "relname", "pg_stat_get_tuples_updated");
pub static DELETES: TableColumnQuery =
    TableColumnQuery::new(queries::TUPLES_DELETED, "relname", "pg_stat_get_tuples_deleted");
pub static HOT_UPDATES: TableColumnQuery = TableColumnQuery::new(
    queries::TUPLES_HOT_UPDATED,
    "relname",
    "pg_stat_get_tuples_hot_updated",
);
pub static RETURNED: TableColumnQuery =
    TableColumnQuery::new(queries::TUPLES_RETURNED, "relname", "pg_stat_get_tuples_returned");
pub static FETCHED: TableColumnQuery =
    TableColumnQuery::new(queries::TUPLES_FETCHED, "relname", "pg_stat_get_tuples_fetched");

pub static SEQ_SCAN: TableColumnQuery =
    TableColumnQuery::new(queries::SEQ_SCANS, "relname", "seq_scan");
pub static SEQ_TUP_READ: TableColumnQuery =
    TableColumnQuery::new(queries::SEQ_TUPLES_READ, "relname", "seq_tup_read");
pub static IDX_SCAN: TableColumnQuery =
    TableColumnQuery::new(queries::INDEX_SCANS, "relname", "idx_scan");
pub static IDX_TUP_FETCH: TableColumnQuery =
    TableColumnQuery::new(queries::INDEX_TUPLES_FETCHED, "relname", "idx_tup_fetch");
pub static HEAP_BLKS_READ: TableColumnQuery =
    TableColumnQuery::new(queries::HEAP_BLOCKS_READ, "relname", "heap_blks_read");
pub static HEAP_BLKS_HIT: TableColumnQuery =
    TableColumnQuery::new(queries::HEAP_BLOCKS_HIT, "relname", "heap_blks_hit");
pub static IDX_BLKS_READ: TableColumnQuery =
    TableColumnQuery::new(queries::INDEX_BLOCKS_READ, "relname", "idx_blks_read");
pub static IDX_BLKS_HIT: TableColumnQuery =
    TableColumnQuery::new(queries::INDEX_BLOCKS_HIT, "relname", "idx_blks_hit");

/// Row estimate for every visible table, from planner statistics.
///
/// Issues one statement per table and never scans table data, so the value
/// is only as fresh as the last `VACUUM`/`ANALYZE`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedRows;

pub static ESTIMATED_ROWS: EstimatedRows = EstimatedRows;

impl TableMetricHandler for EstimatedRows {
    fn collect(
        &self,
        executor: &mut dyn QueryExecutor,
        ctx: &CollectionContext<'_>,
    ) -> Result<TableMetricResult> {
        let mut result = TableMetricResult::new();

        for table in list_tables(executor, ctx.database)? {
            let estimate = estimated_rows_for_table(executor, ctx.database, &table)?;
            result.insert(table, MetricValue::from_integer(estimate, ctx.as_float));
        }

        debug!(database = ctx.database, tables = result.len(), "estimated row counts");
        Ok(result)
    }
}

/// Visible base tables outside the system schemas, in catalog order.
pub fn list_tables(executor: &mut dyn QueryExecutor, database: &str) -> Result<Vec<String>> {
    executor
        .run_query(database, queries::LIST_TABLES, &[])?
        .iter()
        .map(|row| match row.require("relname")? {
            FieldValue::Text(name) => Ok(name.clone()),
            other => Err(StatsError::Query(format!("unexpected table name value {other:?}"))),
        })
        .collect()
}

/// Planner-based row estimate for one table.
pub fn estimated_rows_for_table(
    executor: &mut dyn QueryExecutor,
    database: &str,
    table: &str,
) -> Result<i64> {
    let rows = executor.run_query(database, queries::TABLE_PLANNER_STATS, &[table])?;

    let [row] = rows.as_slice() else {
        return Err(StatsError::Query(format!(
            "expected one planner statistics row for table '{table}', got {}",
            rows.len()
        )));
    };

    let reltuples = row.require("reltuples")?.to_f64()?;
    let relpages = row.require("relpages")?.to_i64()?;
    let relation_size = row.require("relation_size")?.to_i64()?;

    Ok(estimate_row_count(relation_size, relpages, reltuples))
}

/// `relation_size / (page_size * relpages / reltuples)`, rounded half to
/// even like PostgreSQL's float to bigint cast.
///
/// Zero when the table has no tuple or page statistics yet.
pub fn estimate_row_count(relation_size: i64, relpages: i64, reltuples: f64) -> i64 {
    if reltuples <= 0.0 || relpages <= 0 {
        return 0;
    }

    let bytes_per_row = PAGE_SIZE_BYTES * relpages as f64 / reltuples;
    (relation_size as f64 / bytes_per_row).round_ties_even() as i64
}
