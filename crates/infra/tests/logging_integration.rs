//! Installing the global subscriber.
//!
//! Kept in its own test binary: a process can install only one global
//! subscriber, so this file holds a single test.

use pgstats_domain::LogConfig;
use pgstats_infra::observability::init_logging;
use tempfile::TempDir;

#[test]
fn file_logging_writes_events_and_rejects_a_second_install() {
    let dir = TempDir::new().expect("temp dir created");
    let path = dir.path().join("pgstats.log");
    let config = LogConfig {
        file: Some(path.clone()),
        level: "debug".into(),
        rotation: Some("never".into()),
    };

    let guard = init_logging(&config).expect("subscriber installed");
    tracing::info!(database = "shop", "collected table_size");
    tracing::trace!("filtered out below DEBUG");

    let second = init_logging(&LogConfig::default());
    assert!(matches!(second, Err(pgstats_domain::StatsError::Config(_))));

    drop(guard);
    let contents = std::fs::read_to_string(&path).expect("log file written");
    assert!(contents.contains("collected table_size"));
    assert!(contents.contains("database=\"shop\""));
    assert!(!contents.contains("filtered out below DEBUG"));
}
