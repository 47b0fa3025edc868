//! # pgstats Core
//!
//! Metric catalog and collection engine - no database driver dependencies.
//!
//! This crate contains:
//! - Port interfaces for sessions and query execution (traits)
//! - The connection manager and its reuse discipline
//! - The metric registry and the handlers behind each metric
//! - [`StatsService`], the façade a monitoring agent calls
//!
//! ## Architecture Principles
//! - Only depends on `pgstats-domain`
//! - No sockets, no PostgreSQL client code
//! - All I/O goes through [`ports::SessionFactory`]
//! - Single-threaded and blocking: one call chain per collection

pub mod connection;
pub mod executor;
pub mod handlers;
pub mod ports;
pub mod registry;
pub mod service;

// Re-export specific items to avoid ambiguity
pub use connection::{ConnectionManager, ConnectionState};
pub use executor::SessionQueryExecutor;
pub use handlers::{AggregateMetricHandler, CollectionContext, TableMetricHandler};
pub use ports::{DatabaseSession, QueryExecutor, SessionFactory};
pub use registry::{
    AggregateMetricDefinition, MetricDefinition, MetricGroup, MetricRegistry,
    TableMetricDefinition,
};
pub use service::StatsService;
