//! Statistics service - the surface a monitoring agent calls

use std::collections::BTreeSet;

use pgstats_domain::{
    AggregateMetricResult, MetricDescriptor, MetricValue, Result, Row, StatsError,
    TableMetricResult,
};
use tracing::{debug, instrument};

use crate::handlers::{self, CollectionContext};
use crate::ports::QueryExecutor;
use crate::registry::MetricRegistry;

/// Resolves metric names against the registry and runs their handlers.
///
/// Every failure reaches the caller; nothing is retried or replaced by zero.
pub struct StatsService<E> {
    executor: E,
    registry: MetricRegistry,
    exclude_dbs: BTreeSet<String>,
}

impl<E: QueryExecutor> StatsService<E> {
    /// Service over the standard catalog
    pub fn new(executor: E, exclude_dbs: BTreeSet<String>) -> Self {
        Self::with_registry(executor, MetricRegistry::standard(), exclude_dbs)
    }

    /// Service over a caller-supplied catalog.
    pub fn with_registry(
        executor: E,
        registry: MetricRegistry,
        exclude_dbs: BTreeSet<String>,
    ) -> Self {
        Self { executor, registry, exclude_dbs }
    }

    /// The catalog metric names resolve against.
    pub fn registry(&self) -> &MetricRegistry {
        &self.registry
    }

    /// Databases left out of listings and connection counts.
    pub fn exclude_dbs(&self) -> &BTreeSet<String> {
        &self.exclude_dbs
    }

    /// Direct access to the executor, for ad hoc statements.
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Consume the service and hand back its executor.
    pub fn into_executor(self) -> E {
        self.executor
    }

    /// Collect a table-scoped metric for every table of `database`.
    ///
    /// # Errors
    /// `UnknownMetric` when `name` is not a table metric; otherwise whatever
    /// the handler's queries raised.
    #[instrument(level = "debug", skip(self))]
    pub fn collect_table_metric(&mut self, name: &str, database: &str) -> Result<TableMetricResult> {
        let definition = self
            .registry
            .table_metric(name)
            .copied()
            .ok_or_else(|| StatsError::UnknownMetric(format!("table metric '{name}'")))?;

        let ctx = CollectionContext {
            database,
            exclude_dbs: &self.exclude_dbs,
            as_float: definition.reported_as_float,
        };
        let result = definition.handler.collect(&mut self.executor, &ctx)?;

        debug!(metric = name, database, tables = result.len(), "table metric collected");
        Ok(result)
    }

    /// Collect a database-scoped metric for `database`.
    ///
    /// # Errors
    /// `UnknownMetric` when `name` is not an aggregate metric; otherwise
    /// whatever the handler's queries raised.
    #[instrument(level = "debug", skip(self))]
    pub fn collect_aggregate_metric(&mut self, name: &str, database: &str) -> Result<MetricValue> {
        let definition = self
            .registry
            .aggregate_metric(name)
            .copied()
            .ok_or_else(|| StatsError::UnknownMetric(format!("aggregate metric '{name}'")))?;

        let ctx = CollectionContext {
            database,
            exclude_dbs: &self.exclude_dbs,
            as_float: definition.reported_as_float,
        };
        let value = definition.handler.collect(&mut self.executor, &ctx)?;

        debug!(metric = name, database, %value, "aggregate metric collected");
        Ok(value)
    }

    /// Connections per database, or the count for one database (`0` when
    /// it has none).
    pub fn connections(&mut self, database: Option<&str>) -> Result<AggregateMetricResult> {
        handlers::connections_per_database(&mut self.executor, &self.exclude_dbs, database)
    }

    /// Databases in the cluster minus the excluded ones.
    pub fn list_databases(&mut self) -> Result<Vec<String>> {
        handlers::list_databases(&mut self.executor, &self.exclude_dbs)
    }

    /// Visible user tables of `database`.
    pub fn list_tables(&mut self, database: &str) -> Result<Vec<String>> {
        handlers::list_tables(&mut self.executor, database)
    }

    /// Planner-based row estimate for a single table.
    pub fn table_estimated_rows(&mut self, database: &str, table: &str) -> Result<i64> {
        handlers::estimated_rows_for_table(&mut self.executor, database, table)
    }

    /// Lock rows counted by the `locks` metric.
    pub fn locks(&mut self, database: &str) -> Result<Vec<Row>> {
        handlers::lock_rows(&mut self.executor, database)
    }

    /// Names accepted by [`Self::collect_table_metric`].
    pub fn table_metric_names(&self) -> Vec<&'static str> {
        self.registry.table_metric_names()
    }

    /// Names accepted by [`Self::collect_aggregate_metric`].
    pub fn aggregate_metric_names(&self) -> Vec<&'static str> {
        self.registry.aggregate_metric_names()
    }

    /// Table metrics whose values are floats.
    pub fn floating_table_metric_names(&self) -> Vec<&'static str> {
        self.registry.floating_table_metric_names()
    }

    /// Database metrics whose values are floats.
    pub fn floating_aggregate_metric_names(&self) -> Vec<&'static str> {
        self.registry.floating_aggregate_metric_names()
    }

    /// Every catalogued metric with its units, kind and scope.
    pub fn describe(&self) -> Vec<MetricDescriptor> {
        self.registry.descriptors()
    }
}

impl<E> std::fmt::Debug for StatsService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsService")
            .field("registry", &self.registry)
            .field("exclude_dbs", &self.exclude_dbs)
            .finish_non_exhaustive()
    }
}
