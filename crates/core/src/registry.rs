//! Metric registry.
//!
//! The catalog is data: four groups of [`MetricDefinition`] records, each
//! pointing at the handler that computes it. Names are unique within a group
//! and may repeat across groups (`inserts` is both a table counter and a
//! database counter).

use std::fmt;

use pgstats_domain::{MetricDescriptor, MetricKind, MetricScope, Result, StatsError};

use crate::handlers::{aggregate, table, AggregateMetricHandler, TableMetricHandler};

/// One catalog entry.
pub struct MetricDefinition<H: ?Sized + 'static> {
    pub name: &'static str,
    pub units: &'static str,
    pub kind: MetricKind,
    /// Rate should be reported as a real number rather than an integer.
    pub reported_as_float: bool,
    pub handler: &'static H,
}

pub type TableMetricDefinition = MetricDefinition<dyn TableMetricHandler>;
pub type AggregateMetricDefinition = MetricDefinition<dyn AggregateMetricHandler>;

impl<H: ?Sized + 'static> MetricDefinition<H> {
    /// Entry whose value is a point-in-time reading.
    pub fn gauge(name: &'static str, units: &'static str, handler: &'static H) -> Self {
        Self { name, units, kind: MetricKind::Gauge, reported_as_float: false, handler }
    }

    /// Entry whose value is a monotonically growing total.
    pub fn counter(name: &'static str, units: &'static str, handler: &'static H) -> Self {
        Self { name, units, kind: MetricKind::Counter, reported_as_float: false, handler }
    }

    /// Mark the metric as reported with floating-point values.
    pub fn floating(mut self) -> Self {
        self.reported_as_float = true;
        self
    }

    /// Serializable summary of this entry within `scope`.
    pub fn descriptor(&self, scope: MetricScope) -> MetricDescriptor {
        MetricDescriptor {
            name: self.name.to_string(),
            units: self.units.to_string(),
            kind: self.kind,
            scope,
            reported_as_float: self.reported_as_float,
        }
    }
}

// Manual impls: the handler is a shared reference, so copying never needs
// `H: Clone`.
impl<H: ?Sized + 'static> Clone for MetricDefinition<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: ?Sized + 'static> Copy for MetricDefinition<H> {}

impl<H: ?Sized + 'static> fmt::Debug for MetricDefinition<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricDefinition")
            .field("name", &self.name)
            .field("units", &self.units)
            .field("kind", &self.kind)
            .field("reported_as_float", &self.reported_as_float)
            .finish_non_exhaustive()
    }
}

/// Ordered set of definitions with unique names.
pub struct MetricGroup<H: ?Sized + 'static> {
    definitions: Vec<MetricDefinition<H>>,
}

impl<H: ?Sized + 'static> MetricGroup<H> {
    /// Empty group.
    pub fn new() -> Self {
        Self { definitions: Vec::new() }
    }

    /// Add a definition.
    ///
    /// # Errors
    /// Returns `StatsError::InvalidInput` when the name is already taken in
    /// this group.
    pub fn register(&mut self, definition: MetricDefinition<H>) -> Result<()> {
        if self.contains(definition.name) {
            return Err(StatsError::InvalidInput(format!(
                "metric '{}' is already registered in this group",
                definition.name
            )));
        }
        self.definitions.push(definition);
        Ok(())
    }

    /// Build a group from a fixed list; duplicates are rejected.
    pub fn from_definitions(definitions: Vec<MetricDefinition<H>>) -> Result<Self> {
        let mut group = Self::new();
        for definition in definitions {
            group.register(definition)?;
        }
        Ok(group)
    }

    /// Definition registered under `name`.
    pub fn get(&self, name: &str) -> Option<&MetricDefinition<H>> {
        self.definitions.iter().find(|definition| definition.name == name)
    }

    /// Whether `name` is registered in this group.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.iter().map(|definition| definition.name)
    }

    /// Names of the entries reported as floats.
    pub fn floating_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions
            .iter()
            .filter(|definition| definition.reported_as_float)
            .map(|definition| definition.name)
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition<H>> {
        self.definitions.iter()
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the group has no definitions.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<H: ?Sized + 'static> Default for MetricGroup<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized + 'static> fmt::Debug for MetricGroup<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// The four metric groups and the read-only views over them.
#[derive(Debug)]
pub struct MetricRegistry {
    table_gauges: MetricGroup<dyn TableMetricHandler>,
    table_counters: MetricGroup<dyn TableMetricHandler>,
    aggregate_gauges: MetricGroup<dyn AggregateMetricHandler>,
    aggregate_counters: MetricGroup<dyn AggregateMetricHandler>,
}

impl MetricRegistry {
    /// Registry from caller-supplied groups.
    pub fn new(
        table_gauges: MetricGroup<dyn TableMetricHandler>,
        table_counters: MetricGroup<dyn TableMetricHandler>,
        aggregate_gauges: MetricGroup<dyn AggregateMetricHandler>,
        aggregate_counters: MetricGroup<dyn AggregateMetricHandler>,
    ) -> Self {
        Self { table_gauges, table_counters, aggregate_gauges, aggregate_counters }
    }

    /// The PostgreSQL statistics catalog.
    pub fn standard() -> Self {
        let table_gauges = vec![
            TableMetricDefinition::gauge("table_size", "bytes", &table::TABLE_SIZE),
            TableMetricDefinition::gauge("index_size", "bytes", &table::INDEX_SIZE),
            TableMetricDefinition::gauge("estimated_rows", "rows", &table::ESTIMATED_ROWS),
            TableMetricDefinition::gauge("dead", "rows", &table::DEAD),
            TableMetricDefinition::gauge("last_vacuum", "seconds since", &table::LAST_VACUUM),
        ];

        let table_counters = vec![
            TableMetricDefinition::counter("inserts", "inserts/s", &table::INSERTS).floating(),
            TableMetricDefinition::counter("updates", "updates/s", &table::UPDATES).floating(),
            TableMetricDefinition::counter("deletes", "deletes/s", &table::DELETES).floating(),
            TableMetricDefinition::counter("hot_updates", "updates/s", &table::HOT_UPDATES)
                .floating(),
            TableMetricDefinition::counter("seq_scan", "scans/s", &table::SEQ_SCAN).floating(),
            TableMetricDefinition::counter("idx_scan", "scans/s", &table::IDX_SCAN).floating(),
            TableMetricDefinition::counter("seq_tup_read", "rows/s", &table::SEQ_TUP_READ)
                .floating(),
            TableMetricDefinition::counter("idx_tup_fetch", "rows/s", &table::IDX_TUP_FETCH)
                .floating(),
            TableMetricDefinition::counter("heap_blks_read", "blocks/s", &table::HEAP_BLKS_READ)
                .floating(),
            TableMetricDefinition::counter("heap_blks_hit", "blocks/s", &table::HEAP_BLKS_HIT)
                .floating(),
            TableMetricDefinition::counter("idx_blks_read", "blocks/s", &table::IDX_BLKS_READ)
                .floating(),
            TableMetricDefinition::counter("idx_blks_hit", "blocks/s", &table::IDX_BLKS_HIT)
                .floating(),
            TableMetricDefinition::counter("returned", "rows/s", &table::RETURNED),
            TableMetricDefinition::counter("fetched", "rows/s", &table::FETCHED),
        ];

        let aggregate_gauges = vec![
            AggregateMetricDefinition::gauge("locks", "locks", &aggregate::LOCKS),
            AggregateMetricDefinition::gauge("connections", "connections", &aggregate::CONNECTIONS),
        ];

        let aggregate_counters = vec![
            AggregateMetricDefinition::counter("blocks_fetched", "blocks/s", &aggregate::BLOCKS_FETCHED)
                .floating(),
            AggregateMetricDefinition::counter("blocks_hit", "blocks/s", &aggregate::BLOCKS_HIT)
                .floating(),
            AggregateMetricDefinition::counter("commits", "commits/s", &aggregate::COMMITS)
                .floating(),
            AggregateMetricDefinition::counter("rollbacks", "rollbacks/s", &aggregate::ROLLBACKS)
                .floating(),
            AggregateMetricDefinition::counter("inserts", "inserts/s", &aggregate::INSERTS)
                .floating(),
            AggregateMetricDefinition::counter("updates", "updates/s", &aggregate::UPDATES)
                .floating(),
            AggregateMetricDefinition::counter("deletes", "deletes/s", &aggregate::DELETES)
                .floating(),
        ];

        Self {
            table_gauges: MetricGroup { definitions: table_gauges },
            table_counters: MetricGroup { definitions: table_counters },
            aggregate_gauges: MetricGroup { definitions: aggregate_gauges },
            aggregate_counters: MetricGroup { definitions: aggregate_counters },
        }
    }

    /// Table-scoped gauges.
    pub fn table_gauges(&self) -> &MetricGroup<dyn TableMetricHandler> {
        &self.table_gauges
    }

    /// Table-scoped counters.
    pub fn table_counters(&self) -> &MetricGroup<dyn TableMetricHandler> {
        &self.table_counters
    }

    /// Database-scoped gauges.
    pub fn aggregate_gauges(&self) -> &MetricGroup<dyn AggregateMetricHandler> {
        &self.aggregate_gauges
    }

    /// Database-scoped counters.
    pub fn aggregate_counters(&self) -> &MetricGroup<dyn AggregateMetricHandler> {
        &self.aggregate_counters
    }

    /// Resolve a table-scoped metric, gauges first.
    pub fn table_metric(&self, name: &str) -> Option<&TableMetricDefinition> {
        self.table_gauges.get(name).or_else(|| self.table_counters.get(name))
    }

    /// Resolve a database-scoped metric, gauges first.
    pub fn aggregate_metric(&self, name: &str) -> Option<&AggregateMetricDefinition> {
        self.aggregate_gauges.get(name).or_else(|| self.aggregate_counters.get(name))
    }

    /// Every table metric name, gauges then counters, without repeats.
    pub fn table_metric_names(&self) -> Vec<&'static str> {
        union(self.table_gauges.names().chain(self.table_counters.names()))
    }

    /// Every database metric name, gauges then counters, without repeats.
    pub fn aggregate_metric_names(&self) -> Vec<&'static str> {
        union(self.aggregate_gauges.names().chain(self.aggregate_counters.names()))
    }

    /// Table metrics reported as floats.
    pub fn floating_table_metric_names(&self) -> Vec<&'static str> {
        union(self.table_gauges.floating_names().chain(self.table_counters.floating_names()))
    }

    /// Database metrics reported as floats.
    pub fn floating_aggregate_metric_names(&self) -> Vec<&'static str> {
        union(
            self.aggregate_gauges
                .floating_names()
                .chain(self.aggregate_counters.floating_names()),
        )
    }

    /// Descriptors for every entry, table-scoped first.
    pub fn descriptors(&self) -> Vec<MetricDescriptor> {
        let table = self
            .table_gauges
            .iter()
            .chain(self.table_counters.iter())
            .map(|definition| definition.descriptor(MetricScope::Table));
        let aggregate = self
            .aggregate_gauges
            .iter()
            .chain(self.aggregate_counters.iter())
            .map(|definition| definition.descriptor(MetricScope::Aggregate));
        table.chain(aggregate).collect()
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn union(names: impl Iterator<Item = &'static str>) -> Vec<&'static str> {
    let mut result: Vec<&'static str> = Vec::new();
    for name in names {
        if !result.contains(&name) {
            result.push(name);
        }
    }
    result
}
