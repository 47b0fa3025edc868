//! Shared result reshaping.

use pgstats_domain::{FieldValue, MetricValue, Result, Row, StatsError, TableMetricResult};
use tracing::trace;

/// Zip a name column and a value column into a table → value map.
///
/// Rows whose name is `NULL` (a statistics row with no matching table) are
/// skipped; no zero entries are synthesized for missing tables.
pub fn reshape_by_table(
    rows: &[Row],
    table_column: &str,
    value_column: &str,
    as_float: bool,
) -> Result<TableMetricResult> {
    let mut result = TableMetricResult::new();

    for row in rows {
        let table = match row.require(table_column)? {
            FieldValue::Text(name) => name.clone(),
            FieldValue::Null => {
                trace!(column = table_column, "skipping row without a table name");
                continue;
            }
            other => {
                return Err(StatsError::Query(format!(
                    "column '{table_column}' holds {other:?}, expected a table name"
                )))
            }
        };

        let value = MetricValue::from_field(row.require(value_column)?, as_float)?;
        result.insert(table, value);
    }

    Ok(result)
}

/// The value of `column` in the only row of a single-row result.
pub fn single_value(rows: &[Row], column: &str, as_float: bool) -> Result<MetricValue> {
    match rows {
        [row] => MetricValue::from_field(row.require(column)?, as_float),
        [] => Err(StatsError::Query(format!("expected one row for '{column}', got none"))),
        _ => Err(StatsError::Query(format!(
            "expected one row for '{column}', got {}",
            rows.len()
        ))),
    }
}

/// Count rendered in the definition's representation.
pub fn count_value(count: usize, as_float: bool) -> MetricValue {
    MetricValue::from_integer(i64::try_from(count).unwrap_or(i64::MAX), as_float)
}
