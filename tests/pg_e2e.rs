//! End-to-end PostgreSQL smoke test, mirroring
//! `original_source/tests/pge2e/smoke_test.go`'s stage→gen→test cycle for
//! both scenarios against a real, already-running Postgres instance.
//!
//! Ignored by default: requires `PGHOST`/`PGPORT`/`PGDATABASE`/`PGUSER`/
//! `PGPASSWORD` pointing at a reachable, disposable database. Run with
//! `cargo test --test pg_e2e -- --ignored`.

use dbtwool::backend::postgres::PgClient;
use dbtwool::backend::IsolationLevel;
use dbtwool::config::PgConnectParams;
use dbtwool::randgen::RandMode;
use dbtwool::sql::postgres::PgDialect;
use dbtwool::{consistency, lob, ru, stage};

const SCHEMA: &str = "dbtwooltests";

#[tokio::test]
#[ignore]
async fn lob_performance_full_cycle() {
    let client = PgClient::new(PgConnectParams::from_env());
    let dialect = PgDialect;
    let table = "pg_e2e_lob";

    stage::run(&client, &dialect, stage::Scenario::Lob, SCHEMA, table)
        .await
        .expect("stage should create schema and table");

    lob::ingest::run(
        &client,
        &dialect,
        SCHEMA,
        table,
        &["50%:1KB".to_string(), "50%:4KB".to_string()],
        0,
        "5KB",
        10,
        "blob",
    )
    .await
    .expect("gen should ingest synthetic rows without error");

    let report = lob::read_test::run(
        &client, &dialect, SCHEMA, table, 1, 2, 1, 2, RandMode::Scattered, "blob",
    )
    .await
    .expect("read test should complete and report a read count");

    assert!(report.reads > 0, "expected at least one measured read");
    assert!(report.reads_per_second >= 0.0);
}

#[tokio::test]
#[ignore]
async fn ru_performance_full_cycle() {
    let client = PgClient::new(PgConnectParams::from_env());
    let dialect = PgDialect;
    let table = "pg_e2e_ru";

    stage::run(&client, &dialect, stage::Scenario::Ru, SCHEMA, table)
        .await
        .expect("stage should create schema, table, and index");

    ru::gen::run(&client, &dialect, SCHEMA, table, 500)
        .await
        .expect("gen should insert the requested row count");

    let report = ru::test::run(
        &client,
        &dialect,
        SCHEMA,
        table,
        1,
        2,
        IsolationLevel(1),
    )
    .await
    .expect("ru test should run the oltp/olap mix to completion");

    assert!(report.olap_completed > 0, "olap loop never completed a read");
}

#[tokio::test]
#[ignore]
async fn consistency_probe_runs_to_completion() {
    let client = PgClient::new(PgConnectParams::from_env());
    let dialect = PgDialect;
    let table = "pg_e2e_ru";

    consistency::run(&client, &dialect, SCHEMA, table, IsolationLevel(2))
        .await
        .expect("consistency probe should complete both transactions");
}
