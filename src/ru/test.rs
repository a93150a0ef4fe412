//! RU Test Driver (§4.10): an OLTP writer and OLAP reader racing against the
//! same table under a chosen read isolation level, grounded on
//! `original_source/pkg/ruperformance/test_execution.go`'s two-routine shape.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use crate::backend::{Client, Connection, IsolationLevel};
use crate::ru::gen::pick_account_id;
use crate::runctx::RunWindow;
use crate::sql::SqlDialect;

/// Unrelated to the row-generation seed; just needs to be a fixed constant so
/// the OLTP writer's hot-account skew is reproducible run to run.
const OLTP_SEED: u64 = 0x0BADC0DE;

#[derive(Debug, Clone, Copy)]
pub struct RuTestReport {
    pub olap_completed: i64,
    pub oltp_ops: i64,
    pub olap_per_second: f64,
}

pub async fn run(
    client: &dyn Client,
    dialect: &dyn SqlDialect,
    schema: &str,
    table: &str,
    warmup_secs: u64,
    execution_secs: u64,
    isolation_level: IsolationLevel,
) -> anyhow::Result<RuTestReport> {
    let pool = client.pool().await?;

    let mut oltp_conn = pool.connect().await?;
    let mut olap_conn = pool.connect().await?;
    olap_conn.set_isolation_level(isolation_level).await?;

    let window = RunWindow::new(
        Duration::from_secs(warmup_secs),
        Duration::from_secs(execution_secs),
    );
    let oltp_ops = AtomicI64::new(0);
    let olap_completed = AtomicI64::new(0);
    let olap_sql = dialect.ru_olap_sql(schema, table);

    let oltp_fut = oltp_loop(&mut *oltp_conn, &window, &oltp_ops, dialect, schema, table);
    let olap_fut = olap_loop(&mut *olap_conn, &window, &olap_completed, &olap_sql);

    // Group-join semantics (§4.10): drive the warmup/total clock and both
    // workers concurrently; a real error from either aborts the test (the
    // first one `?` sees), cancellation errors are already swallowed inside
    // each loop.
    let (_, oltp_result, olap_result) = tokio::join!(window.drive(), oltp_fut, olap_fut);
    oltp_result?;
    olap_result?;

    oltp_conn.close().await?;
    olap_conn.close().await?;

    let elapsed = window.elapsed_since_start();
    let olap_completed = olap_completed.load(Ordering::Acquire);
    let oltp_ops = oltp_ops.load(Ordering::Acquire);
    let olap_per_second = olap_completed as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    Ok(RuTestReport {
        olap_completed,
        oltp_ops,
        olap_per_second,
    })
}

async fn oltp_loop(
    conn: &mut dyn Connection,
    window: &RunWindow,
    oltp_ops: &AtomicI64,
    dialect: &dyn SqlDialect,
    schema: &str,
    table: &str,
) -> anyhow::Result<()> {
    let mut step: u64 = 0;
    loop {
        if window.is_expired() {
            return Ok(());
        }

        let acct_id = pick_account_id(OLTP_SEED, step);
        let sql = dialect.ru_oltp_sql(schema, table, acct_id);

        match run_oltp_transaction(conn, &sql).await {
            Ok(()) => {
                oltp_ops.fetch_add(1, Ordering::AcqRel);
            }
            Err(e) => {
                if window.is_expired() {
                    return Ok(());
                }
                return Err(e);
            }
        }
        step += 1;

        if window.is_expired() {
            return Ok(());
        }
    }
}

async fn run_oltp_transaction(conn: &mut dyn Connection, sql: &str) -> anyhow::Result<()> {
    conn.begin().await?;
    match conn.execute(sql).await {
        Ok(_) => {
            conn.commit().await?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.rollback().await;
            Err(e)
        }
    }
}

async fn olap_loop(
    conn: &mut dyn Connection,
    window: &RunWindow,
    olap_completed: &AtomicI64,
    olap_sql: &str,
) -> anyhow::Result<()> {
    loop {
        if window.is_expired() {
            return Ok(());
        }

        match conn.query_one_row(olap_sql, &[]).await {
            Ok(_row) => {
                if window.is_measuring() {
                    olap_completed.fetch_add(1, Ordering::AcqRel);
                    window.mark_measured_start();
                }
            }
            Err(e) => {
                if window.is_expired() {
                    return Ok(());
                }
                return Err(e);
            }
        }

        if window.is_expired() {
            return Ok(());
        }
    }
}
