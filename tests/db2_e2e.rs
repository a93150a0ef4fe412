//! End-to-end DB2 smoke test, mirroring
//! `original_source/tests/db2e2e/smoke_test.go`'s stage→gen→test cycle for
//! both scenarios against a real, already-running DB2 instance.
//!
//! Ignored by default: requires `DB2_HOST`/`DB2_PORT`/`DB2_DATABASE`/
//! `DB2_USER`/`DB2_PASSWORD` pointing at a reachable, disposable database
//! with the IBM DB2 ODBC driver installed. Run with
//! `cargo test --test db2_e2e -- --ignored`.

use dbtwool::backend::db2::Db2Client;
use dbtwool::backend::IsolationLevel;
use dbtwool::config::Db2ConnectParams;
use dbtwool::randgen::RandMode;
use dbtwool::sql::db2::Db2Dialect;
use dbtwool::{consistency, lob, ru, stage};

const SCHEMA: &str = "dbtwooltests";

#[tokio::test]
#[ignore]
async fn lob_performance_full_cycle() {
    let client = Db2Client::new(Db2ConnectParams::from_env());
    let dialect = Db2Dialect;
    let table = "db2_e2e_lob";

    stage::run(&client, &dialect, stage::Scenario::Lob, SCHEMA, table)
        .await
        .expect("stage should create schema and table");

    lob::ingest::run(
        &client,
        &dialect,
        SCHEMA,
        table,
        &["100%:2KB".to_string()],
        0,
        "2KB",
        10,
        "clob",
    )
    .await
    .expect("gen should ingest synthetic rows without error");

    let report = lob::read_test::run(
        &client, &dialect, SCHEMA, table, 1, 2, 1, 2, RandMode::Sequential, "clob",
    )
    .await
    .expect("read test should complete and report a read count");

    assert!(report.reads > 0, "expected at least one measured read");
}

#[tokio::test]
#[ignore]
async fn ru_performance_full_cycle() {
    let client = Db2Client::new(Db2ConnectParams::from_env());
    let dialect = Db2Dialect;
    let table = "db2_e2e_ru";

    stage::run(&client, &dialect, stage::Scenario::Ru, SCHEMA, table)
        .await
        .expect("stage should create schema, table, and index");

    ru::gen::run(&client, &dialect, SCHEMA, table, 500)
        .await
        .expect("gen should insert the requested row count");

    let report = ru::test::run(&client, &dialect, SCHEMA, table, 1, 2, IsolationLevel(2))
        .await
        .expect("ru test should run the oltp/olap mix to completion");

    assert!(report.olap_completed > 0, "olap loop never completed a read");
}
