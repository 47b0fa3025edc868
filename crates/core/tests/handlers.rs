//! Metric handlers driven through `StatsService` with scripted results.

mod support;

use std::collections::{BTreeMap, BTreeSet};

use pgstats_core::handlers::queries;
use pgstats_core::{SessionQueryExecutor, StatsService};
use pgstats_domain::{
    AggregateMetricResult, FieldValue, MetricValue, Result, Row, StatsConfig, StatsError,
};
use support::{empty_executor, FnExecutor, MockSessionFactory};

fn excluded(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn activity_rows() -> Vec<Row> {
    vec![
        Row::new().with("datname", "alpha").with("count", 3_i64),
        Row::new().with("datname", "beta").with("count", 5_i64),
        Row::new().with("datname", FieldValue::Null).with("count", 2_i64),
    ]
}

fn database_rows(names: &[&str]) -> Vec<Row> {
    names
        .iter()
        .map(|name| Row::new().with("Database", *name).with("Owner", "postgres"))
        .collect()
}

#[test]
fn every_table_metric_is_empty_for_a_database_without_tables() {
    let mut service = StatsService::new(empty_executor(), BTreeSet::new());

    for name in service.table_metric_names() {
        let result = service.collect_table_metric(name, "empty").unwrap();
        assert!(result.is_empty(), "{name} returned {result:?}");
    }
}

#[test]
fn aggregate_metrics_are_zero_without_activity() {
    let executor = FnExecutor::new(|_: &str, sql: &str, _: &[&str]| -> Result<Vec<Row>> {
        if sql == queries::LOCKS {
            return Ok(Vec::new());
        }
        Ok(vec![Row::new()
            .with("pg_stat_get_db_blocks_fetched", 0_i64)
            .with("pg_stat_get_db_blocks_hit", 0_i64)
            .with("pg_stat_get_db_xact_commit", 0_i64)
            .with("pg_stat_get_db_xact_rollback", 0_i64)
            .with("pg_stat_get_db_tuples_inserted", 0_i64)
            .with("pg_stat_get_db_tuples_updated", 0_i64)
            .with("pg_stat_get_db_tuples_deleted", 0_i64)])
    });
    let mut service = StatsService::new(executor, BTreeSet::new());
    let floating = service.floating_aggregate_metric_names();

    for name in service.aggregate_metric_names() {
        if name == "connections" {
            continue;
        }
        let value = service.collect_aggregate_metric(name, "quiet").unwrap();
        let expected = if floating.contains(&name) {
            MetricValue::Float(0.0)
        } else {
            MetricValue::Integer(0)
        };
        assert_eq!(value, expected, "{name}");
    }
}

#[test]
fn database_counters_bind_the_database_name() {
    let executor = FnExecutor::new(|_: &str, _: &str, params: &[&str]| -> Result<Vec<Row>> {
        assert_eq!(params, ["shop"]);
        Ok(vec![Row::new().with("pg_stat_get_db_xact_commit", 42_i64)])
    });
    let mut service = StatsService::new(executor, BTreeSet::new());

    let commits = service.collect_aggregate_metric("commits", "shop").unwrap();

    assert_eq!(commits, MetricValue::Float(42.0));
    let call = &service.executor_mut().calls()[0];
    assert_eq!(call.database, "shop");
    assert!(!call.sql.contains("shop"));
}

#[test]
fn database_counter_without_a_row_is_an_error() {
    let mut service = StatsService::new(empty_executor(), BTreeSet::new());

    let err = service.collect_aggregate_metric("rollbacks", "dropped").unwrap_err();

    assert!(matches!(err, StatsError::Query(_)), "got {err:?}");
}

#[test]
fn table_counters_follow_the_float_flag() {
    let executor = FnExecutor::new(|_: &str, sql: &str, _: &[&str]| -> Result<Vec<Row>> {
        if sql == queries::INDEX_SCANS {
            Ok(vec![
                Row::new().with("relname", "orders").with("idx_scan", 7_i64),
                Row::new().with("relname", "audit_log").with("idx_scan", FieldValue::Null),
            ])
        } else if sql == queries::TUPLES_RETURNED {
            Ok(vec![Row::new()
                .with("relname", "orders")
                .with("pg_stat_get_tuples_returned", 90_i64)])
        } else {
            Ok(Vec::new())
        }
    });
    let mut service = StatsService::new(executor, BTreeSet::new());

    let scans = service.collect_table_metric("idx_scan", "shop").unwrap();
    assert_eq!(scans["orders"], MetricValue::Float(7.0));
    // No indexes yet: NULL reads as zero.
    assert_eq!(scans["audit_log"], MetricValue::Float(0.0));

    let returned = service.collect_table_metric("returned", "shop").unwrap();
    assert_eq!(returned, BTreeMap::from([("orders".to_string(), MetricValue::Integer(90))]));
}

#[test]
fn estimated_rows_use_planner_statistics() {
    let executor = FnExecutor::new(|_: &str, sql: &str, params: &[&str]| -> Result<Vec<Row>> {
        if sql == queries::LIST_TABLES {
            return Ok(vec![
                Row::new().with("relname", "orders"),
                Row::new().with("relname", "fresh"),
            ]);
        }
        assert_eq!(sql, queries::TABLE_PLANNER_STATS);
        let row = match params {
            ["orders"] => Row::new()
                .with("reltuples", 1000.0)
                .with("relpages", 10_i64)
                .with("relation_size", 81_920_i64),
            ["fresh"] => Row::new()
                .with("reltuples", 0.0)
                .with("relpages", 0_i64)
                .with("relation_size", 8_192_i64),
            other => panic!("unexpected parameters {other:?}"),
        };
        Ok(vec![row])
    });
    let mut service = StatsService::new(executor, BTreeSet::new());

    let estimates = service.collect_table_metric("estimated_rows", "shop").unwrap();

    assert_eq!(estimates["orders"], MetricValue::Integer(1000));
    assert_eq!(estimates["fresh"], MetricValue::Integer(0));
    assert_eq!(service.table_estimated_rows("shop", "orders").unwrap(), 1000);
}

#[test]
fn connections_skip_excluded_databases_and_background_workers() {
    let executor = FnExecutor::new(|database: &str, sql: &str, _: &[&str]| -> Result<Vec<Row>> {
        assert_eq!(database, "postgres");
        assert_eq!(sql, queries::CONNECTIONS_PER_DATABASE);
        Ok(activity_rows())
    });
    let mut service = StatsService::new(executor, excluded(&["beta"]));

    let all = service.connections(None).unwrap();
    assert_eq!(
        all,
        AggregateMetricResult::PerDatabase(BTreeMap::from([("alpha".to_string(), 3)]))
    );

    let alpha = service.connections(Some("alpha")).unwrap();
    assert_eq!(alpha.as_scalar(), Some(MetricValue::Integer(3)));

    let gamma = service.connections(Some("gamma")).unwrap();
    assert_eq!(gamma.as_scalar(), Some(MetricValue::Integer(0)));

    let metric = service.collect_aggregate_metric("connections", "alpha").unwrap();
    assert_eq!(metric, MetricValue::Integer(3));
}

#[test]
fn list_databases_removes_exclusions_and_keeps_order() {
    let names = ["postgres", "alpha", "beta", "template1"];
    let cases: [(&[&str], Vec<&str>); 3] = [
        (&[], names.to_vec()),
        (&["beta", "template1"], vec!["postgres", "alpha"]),
        (&names[..], Vec::new()),
    ];

    for (exclude, expected) in cases {
        let executor = FnExecutor::new(|_: &str, _: &str, _: &[&str]| -> Result<Vec<Row>> {
            Ok(database_rows(&names))
        });
        let mut service = StatsService::new(executor, excluded(exclude));

        let databases = service.list_databases().unwrap();

        assert_eq!(databases, expected, "exclusions {exclude:?}");
        assert!(databases.iter().all(|db| !service.exclude_dbs().contains(db)));
    }
}

#[test]
fn locks_count_lock_rows() {
    let executor = FnExecutor::new(|_: &str, sql: &str, params: &[&str]| -> Result<Vec<Row>> {
        assert_eq!(sql, queries::LOCKS);
        assert_eq!(params, ["shop"]);
        Ok((0..3_i64)
            .map(|pid| {
                Row::new()
                    .with("pid", 4000 + pid)
                    .with("datname", "shop")
                    .with("relname", "orders")
                    .with("mode", "RowExclusiveLock")
            })
            .collect())
    });
    let mut service = StatsService::new(executor, BTreeSet::new());

    assert_eq!(service.locks("shop").unwrap().len(), 3);
    assert_eq!(service.collect_aggregate_metric("locks", "shop").unwrap(), MetricValue::Integer(3));
}

#[test]
fn unknown_metric_names_are_rejected() {
    let mut service = StatsService::new(empty_executor(), BTreeSet::new());

    let table = service.collect_table_metric("commits", "shop").unwrap_err();
    let aggregate = service.collect_aggregate_metric("table_size", "shop").unwrap_err();

    assert!(matches!(table, StatsError::UnknownMetric(_)));
    assert!(matches!(aggregate, StatsError::UnknownMetric(_)));
}

#[test]
fn severed_connection_fails_the_collection() {
    let factory = MockSessionFactory::with_responder(|_, _, _| {
        Ok(vec![Row::new().with("relname", "orders").with("pg_stat_get_dead_tuples", 4_i64)])
    });
    let executor = SessionQueryExecutor::new(factory.clone(), StatsConfig::default());
    let mut service = StatsService::new(executor, BTreeSet::new());

    let dead = service.collect_table_metric("dead", "shop").unwrap();
    assert_eq!(dead["orders"], MetricValue::Integer(4));

    factory.sever_latest();
    let err = service.collect_table_metric("dead", "shop").unwrap_err();
    assert!(matches!(err, StatsError::Query(_)), "got {err:?}");
}
