//! Tests for solving through the app and persisting tables.
//!
//! The in-memory repository keeps most of these off the disk; the MessagePack
//! round trip uses a temporary directory.

mod common;

use std::path::Path;

use common::{SMALL, test_registry};
use mouselab::{
    Error,
    adapters::{InMemoryRepository, MsgPackRepository},
    app::{App, SolveConfig},
    dictionary::{CountingObserver, Table, TableKind},
    ports::NoopObserver,
};
use tempfile::TempDir;

fn app_with_memory() -> App {
    App::for_testing()
        .with_repository(InMemoryRepository::new())
        .with_registry(test_registry())
        .build()
        .expect("app with in-memory repository")
}

#[test]
fn solve_without_table() {
    let app = app_with_memory();
    let summary = app
        .solve(SMALL, &SolveConfig::new(), None, &mut NoopObserver)
        .expect("solve small case");

    assert_eq!(summary.env_name, SMALL);
    assert_eq!(summary.value, -471.0);
    assert!(summary.table.is_none());
    assert!(summary.stats.v_calls > 0);
    assert!(summary.total_time >= summary.solve_time);
}

#[test]
fn q_table_round_trip_in_memory() {
    let app = app_with_memory();
    let config = SolveConfig::new().with_table(TableKind::Q);
    let mut observer = CountingObserver::default();
    let summary = app
        .solve(SMALL, &config, None, &mut observer)
        .expect("solve with q table");

    let table = summary.table.expect("q table requested");
    assert_eq!(table.kind(), TableKind::Q);
    assert_eq!(table.len(), 39);
    assert_eq!(observer.solved, 39);

    let path = Path::new("small_q");
    app.save_table(&table, path).expect("save table");
    let loaded = app.load_table(path).expect("load table");
    assert_eq!(loaded, table);
}

#[test]
fn partial_policy_table_from_ground_truths() {
    let app = app_with_memory();
    let config = SolveConfig::new().with_table(TableKind::Policy);
    let ground_truths = vec![vec![0.0, -500.0, 60.0, -60.0]];
    let summary = app
        .solve(SMALL, &config, Some(ground_truths.as_slice()), &mut NoopObserver)
        .expect("partial solve");

    let Some(Table::Policy(policy)) = summary.table else {
        panic!("policy table requested");
    };
    assert_eq!(policy.len(), 8);
}

#[test]
fn policy_table_round_trip_on_disk() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("small_pi.msgpack");

    let app = App::for_testing()
        .with_repository(MsgPackRepository::new())
        .with_registry(test_registry())
        .build()
        .expect("app with msgpack repository");
    let config = SolveConfig::new().with_table(TableKind::Policy);
    let summary = app
        .solve(SMALL, &config, None, &mut NoopObserver)
        .expect("solve with policy table");
    let table = summary.table.expect("policy table requested");

    app.save_table(&table, &path).expect("save table");
    assert!(path.exists());
    let loaded = app.load_table(&path).expect("load table");
    assert_eq!(loaded, table);

    let policy = loaded.as_policy().expect("policy table");
    let init = app
        .create_env(SMALL, &config)
        .expect("small environment")
        .init()
        .clone();
    assert_eq!(policy.get(&init).expect("initial state").max_actions, vec![2, 3]);
}

#[test]
fn unknown_environment_is_reported() {
    let app = app_with_memory();
    let err = app
        .solve("missing", &SolveConfig::new(), None, &mut NoopObserver)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownEnvironment { .. }));
}

#[test]
fn loading_an_unsaved_table_fails() {
    let app = app_with_memory();
    assert!(app.load_table(Path::new("never_saved")).is_err());
}

#[test]
fn rewarded_fraction_reaches_the_environment() {
    let app = app_with_memory();
    let config = SolveConfig::new().with_cost(20.0).with_pct_reward(0.5);
    let summary = app
        .solve(SMALL, &config, None, &mut NoopObserver)
        .expect("solve with scarce rewards");
    assert_eq!(summary.value, -250.0);

    let err = app
        .solve(SMALL, &SolveConfig::new().with_pct_reward(1.5), None, &mut NoopObserver)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { .. }));
}
