//! Metric types shared by the catalog and its consumers
//!
//! This module centralizes the shapes a collection call can produce:
//! - Scalar metric values (integer or floating)
//! - Per-table result maps
//! - Per-database results (scalar, or the full connections map)
//! - Catalog descriptors used for introspection without collecting

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::database::FieldValue;
use crate::errors::Result;

/* -------------------------------------------------------------------------- */
/* Metric Classification */
/* -------------------------------------------------------------------------- */

/// Semantic kind of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Absolute snapshot (e.g. table size).
    Gauge,
    /// Cumulative since server start; the agent derives a rate.
    Counter,
}

/// What a metric is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricScope {
    /// One value per table within a database.
    Table,
    /// One value per database.
    Aggregate,
}

/* -------------------------------------------------------------------------- */
/* Metric Values */
/* -------------------------------------------------------------------------- */

/// A single numeric fact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
}

impl MetricValue {
    /// Zero in the representation selected by `as_float`.
    pub fn zero(as_float: bool) -> Self {
        if as_float {
            MetricValue::Float(0.0)
        } else {
            MetricValue::Integer(0)
        }
    }

    /// An integer result in the representation selected by `as_float`.
    pub fn from_integer(value: i64, as_float: bool) -> Self {
        if as_float {
            MetricValue::Float(value as f64)
        } else {
            MetricValue::Integer(value)
        }
    }

    /// Convert a raw column value, choosing the representation from the
    /// definition's floating flag.
    pub fn from_field(value: &FieldValue, as_float: bool) -> Result<Self> {
        if as_float {
            value.to_f64().map(MetricValue::Float)
        } else {
            value.to_i64().map(MetricValue::Integer)
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Integer(value) => value as f64,
            MetricValue::Float(value) => value,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, MetricValue::Float(_))
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Integer(value) => write!(f, "{value}"),
            MetricValue::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Table name → value, for one database. Tables without a statistics row are
/// absent rather than zero.
pub type TableMetricResult = BTreeMap<String, MetricValue>;

/// Result of a database-scoped metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateMetricResult {
    Scalar(MetricValue),
    /// Only produced by the connections metric when no database is named.
    PerDatabase(BTreeMap<String, i64>),
}

impl AggregateMetricResult {
    pub fn as_scalar(&self) -> Option<MetricValue> {
        match self {
            AggregateMetricResult::Scalar(value) => Some(*value),
            AggregateMetricResult::PerDatabase(_) => None,
        }
    }

    pub fn as_per_database(&self) -> Option<&BTreeMap<String, i64>> {
        match self {
            AggregateMetricResult::PerDatabase(map) => Some(map),
            AggregateMetricResult::Scalar(_) => None,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Catalog Descriptors */
/* -------------------------------------------------------------------------- */

/// Serializable view of one catalog entry, without its handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub name: String,
    pub units: String,
    pub kind: MetricKind,
    pub scope: MetricScope,
    pub reported_as_float: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_field_honours_float_flag() {
        let raw = FieldValue::Int(1200);
        assert_eq!(MetricValue::from_field(&raw, false).unwrap(), MetricValue::Integer(1200));
        assert_eq!(MetricValue::from_field(&raw, true).unwrap(), MetricValue::Float(1200.0));
    }

    #[test]
    fn zero_matches_representation() {
        assert_eq!(MetricValue::zero(false), MetricValue::Integer(0));
        assert!(MetricValue::zero(true).is_float());
    }

    #[test]
    fn values_serialize_as_bare_numbers() {
        let mut tables = TableMetricResult::new();
        tables.insert("orders".into(), MetricValue::Integer(3));
        tables.insert("users".into(), MetricValue::Float(1.5));

        let json = serde_json::to_string(&tables).unwrap();
        assert_eq!(json, r#"{"orders":3,"users":1.5}"#);
    }

    #[test]
    fn aggregate_result_accessors() {
        let scalar = AggregateMetricResult::Scalar(MetricValue::Integer(4));
        assert_eq!(scalar.as_scalar(), Some(MetricValue::Integer(4)));
        assert!(scalar.as_per_database().is_none());

        let map = AggregateMetricResult::PerDatabase(BTreeMap::from([("alpha".to_string(), 3)]));
        assert_eq!(map.as_per_database().and_then(|m| m.get("alpha")), Some(&3));
    }
}
