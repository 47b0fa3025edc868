//! Domain types and models

pub mod database;
pub mod stats;

// Re-export for convenience
pub use database::{ConnectionParams, FieldValue, Row};
pub use stats::{
    AggregateMetricResult, MetricDescriptor, MetricKind, MetricScope, MetricValue,
    TableMetricResult,
};
