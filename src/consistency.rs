//! Consistency Probe (§4.12): an observability tool, not a throughput test —
//! its log lines around each step are the deliverable. Grounded on
//! `original_source/pkg/ruperformance/db_helper.go`'s two-connection pattern
//! and `spec.md` scenario 6's literal event ordering.

use std::time::Duration;

use crate::backend::{Client, IsolationLevel};
use crate::sql::SqlDialect;

/// Fixed hot-account id the probe locks and updates; the probe demonstrates
/// lock/visibility behavior, not throughput, so one account is enough.
const PROBE_ACCT_ID: i64 = 1;
const HOLD_SECS: u64 = 10;

pub async fn run(
    client: &dyn Client,
    dialect: &dyn SqlDialect,
    schema: &str,
    table: &str,
    isolation_level: IsolationLevel,
) -> anyhow::Result<()> {
    let pool = client.pool().await?;

    let mut conn1 = pool.connect().await?;
    let mut conn2 = pool.connect().await?;
    conn2.set_isolation_level(isolation_level).await?;

    let olap_sql = dialect.ru_olap_sql(schema, table);
    let lock_sql = dialect.ru_lock_rows_sql(schema, table);
    let update_sql = dialect.ru_oltp_sql(schema, table, PROBE_ACCT_ID);

    conn1.begin().await?;
    tracing::info!("T1 BEGIN");

    conn1.query_one_row(&olap_sql, &[]).await?;
    tracing::info!("T1 OLAP");

    conn1.query(&lock_sql, &[]).await?;
    tracing::info!("T1 LOCK");

    let olap_sql_t2 = olap_sql.clone();
    let t2 = tokio::spawn(async move {
        conn2.begin().await?;
        tracing::info!("T2 BEGIN");

        conn2.query_one_row(&olap_sql_t2, &[]).await?;
        tracing::info!("T2 OLAP");

        conn2.commit().await?;
        tracing::info!("T2 COMMIT");

        conn2.close().await?;
        Ok::<(), anyhow::Error>(())
    });

    tokio::time::sleep(Duration::from_secs(HOLD_SECS)).await;
    t2.await??;

    conn1.execute(&update_sql).await?;
    tracing::info!("T1 UPDATE");

    conn1.commit().await?;
    tracing::info!("T1 COMMIT");

    conn1.close().await?;

    Ok(())
}
