//! Catalog accessors over the standard registry.

use std::collections::BTreeSet;

use pgstats_core::MetricRegistry;
use pgstats_domain::{MetricKind, MetricScope};

fn set(names: Vec<&'static str>) -> BTreeSet<&'static str> {
    names.into_iter().collect()
}

#[test]
fn table_catalog_has_nineteen_metrics() {
    let registry = MetricRegistry::standard();

    assert_eq!(registry.table_gauges().len(), 5);
    assert_eq!(registry.table_counters().len(), 14);
    assert_eq!(registry.table_metric_names().len(), 19);
    assert_eq!(registry.floating_table_metric_names().len(), 12);
}

#[test]
fn aggregate_catalog_has_nine_float_counters() {
    let registry = MetricRegistry::standard();

    assert_eq!(registry.aggregate_gauges().len(), 2);
    assert_eq!(registry.aggregate_counters().len(), 7);
    assert_eq!(registry.aggregate_metric_names().len(), 9);
    assert_eq!(
        set(registry.floating_aggregate_metric_names()),
        set(registry.aggregate_counters().names().collect())
    );
}

#[test]
fn every_table_metric_is_either_float_or_integer() {
    let registry = MetricRegistry::standard();

    let all = set(registry.table_metric_names());
    let floating = set(registry.floating_table_metric_names());
    let integer: BTreeSet<_> = all.difference(&floating).copied().collect();

    assert!(floating.is_subset(&all));
    assert!(floating.is_disjoint(&integer));
    assert_eq!(&floating | &integer, all);
    assert_eq!(
        integer,
        set(vec![
            "table_size",
            "index_size",
            "estimated_rows",
            "dead",
            "last_vacuum",
            "returned",
            "fetched"
        ])
    );
}

#[test]
fn names_repeat_across_groups_as_distinct_definitions() {
    let registry = MetricRegistry::standard();

    let table = registry.table_metric("inserts").unwrap();
    let aggregate = registry.aggregate_metric("inserts").unwrap();

    assert_eq!(table.kind, MetricKind::Counter);
    assert_eq!(aggregate.kind, MetricKind::Counter);
    assert!(table.reported_as_float && aggregate.reported_as_float);
    assert!(registry.table_metric("commits").is_none());
    assert!(registry.aggregate_metric("seq_scan").is_none());
}

#[test]
fn units_follow_the_catalog() {
    let registry = MetricRegistry::standard();

    let units = |name: &str| registry.table_metric(name).map(|d| d.units);
    assert_eq!(units("table_size"), Some("bytes"));
    assert_eq!(units("last_vacuum"), Some("seconds since"));
    assert_eq!(units("heap_blks_hit"), Some("blocks/s"));

    assert_eq!(registry.aggregate_metric("locks").map(|d| d.units), Some("locks"));
    assert_eq!(registry.aggregate_metric("rollbacks").map(|d| d.units), Some("rollbacks/s"));
}

#[test]
fn descriptors_cover_the_whole_catalog() {
    let registry = MetricRegistry::standard();
    let descriptors = registry.descriptors();

    assert_eq!(descriptors.len(), 28);
    assert_eq!(descriptors.iter().filter(|d| d.scope == MetricScope::Table).count(), 19);

    let json = serde_json::to_value(&descriptors[0]).unwrap();
    assert_eq!(json["name"], "table_size");
    assert_eq!(json["kind"], "gauge");
    assert_eq!(json["scope"], "table");
}
