//! LOB Ingestion Driver (§4.7). Grounded on
//! `original_source/pkg/lobperformance/{gen,bulk_gen,test_execution}.go`'s
//! batch-loop shape, and on the teacher's `src/bin/backfill/main.rs` for the
//! progress/ETA logging style.

use std::time::Instant;

use crate::backend::{Client, ColumnValue, LobBulkRow, Payload};
use crate::errors::IngestError;
use crate::lobplan::{build_lob_plan, shuffled_indices, LobKind, LobRowPlan};
use crate::payload::{generate_binary_payload, generate_text_payload};
use crate::sizeparse::parse_spread;
use crate::sql::SqlDialect;

/// Fixed shuffle seed so ingestion order is reproducible across runs (§4.7,
/// §9's "seed=0 dual meaning" open question — this is never 0).
const SHUFFLE_SEED: u64 = 12345;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    client: &dyn Client,
    dialect: &dyn SqlDialect,
    schema: &str,
    table: &str,
    spread: &[String],
    empty_lobs: i64,
    byte_size: &str,
    batch_size: usize,
    lob_type: &str,
) -> anyhow::Result<()> {
    tracing::info!("initiating connection pool");
    let pool = client.pool().await?;

    tracing::info!("connecting to database");
    let mut conn = pool.connect().await?;

    let total_bytes = crate::sizeparse::parse_byte_size(byte_size)?;
    tracing::info!(total_bytes, "parsed total byte budget");

    let buckets = spread
        .iter()
        .map(|s| parse_spread(s))
        .collect::<Result<Vec<_>, _>>()?;

    let kind = LobKind::parse(lob_type)
        .ok_or_else(|| anyhow::anyhow!("unsupported lobType {lob_type:?}"))?;

    tracing::info!("building LOB generation plan");
    let plan = build_lob_plan(total_bytes, kind, &buckets, empty_lobs)?;
    tracing::info!(rows = plan.len(), "LOB generation plan built");

    let insert_sql = dialect.lob_insert_one_row_sql(schema, table, lob_type)?;
    let idx = shuffled_indices(plan.len(), SHUFFLE_SEED);
    let total = idx.len();
    let started_at = Instant::now();

    for (batch_index, chunk) in idx.chunks(batch_size.max(1)).enumerate() {
        let batch: Vec<&LobRowPlan> = chunk.iter().map(|&k| &plan[k]).collect();
        validate_batch(batch_index, &batch)?;

        let done_before = batch_index * batch_size.max(1);

        if let Some(bulk) = conn.bulk_inserter() {
            let rows = batch
                .iter()
                .map(|row| build_bulk_row(row))
                .collect::<Vec<_>>();
            let (rows_altered, bytes_altered) = bulk
                .insert_lob_rows_bulk(schema, table, rows)
                .await
                .map_err(|e| IngestError::BatchFailed {
                    batch_index,
                    source: e.to_string(),
                })?;
            tracing::debug!(
                batch_index,
                rows = batch.len(),
                rows_altered,
                bytes_altered,
                "bulk LOB batch finished"
            );
        } else {
            run_prepared_batch(&mut *conn, &insert_sql, batch_index, &batch).await?;
        }

        let done_after = done_before + chunk.len();
        let pct = 100.0 * done_after as f64 / total.max(1) as f64;
        let elapsed = started_at.elapsed();
        let eta = if done_after > 0 {
            elapsed.mul_f64((total - done_after) as f64 / done_after as f64)
        } else {
            std::time::Duration::ZERO
        };
        tracing::info!(
            from = done_before + 1,
            to = done_after,
            total,
            pct,
            eta_secs = eta.as_secs(),
            "inserted LOBs"
        );
    }

    Ok(())
}

fn validate_batch(batch_index: usize, batch: &[&LobRowPlan]) -> Result<(), IngestError> {
    let Some(first) = batch.first() else {
        return Ok(());
    };
    for row in batch {
        if row.lob_kind != first.lob_kind {
            return Err(IngestError::MixedLobKindInBatch { batch_index });
        }
        if row.lob_bytes < 0 {
            return Err(IngestError::NegativeSize {
                batch_index,
                size: row.lob_bytes,
            });
        }
    }
    Ok(())
}

fn build_payload(row: &LobRowPlan) -> Payload {
    match row.lob_kind {
        LobKind::Blob => Payload::Bin(generate_binary_payload(row.lob_bytes as usize)),
        LobKind::Clob => Payload::Text(generate_text_payload(row.lob_bytes as usize)),
    }
}

fn build_bulk_row(row: &LobRowPlan) -> LobBulkRow {
    let (payload_bin, payload_text) = match build_payload(row) {
        Payload::Bin(b) => (Some(b), None),
        Payload::Text(t) => (None, Some(t)),
    };
    LobBulkRow {
        tenant_id: row.tenant_id,
        doc_type: row.doc_type.clone(),
        payload_bin,
        payload_text,
    }
}

async fn run_prepared_batch(
    conn: &mut dyn crate::backend::Connection,
    insert_sql: &str,
    batch_index: usize,
    batch: &[&LobRowPlan],
) -> anyhow::Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    conn.begin().await.map_err(|e| IngestError::BatchFailed {
        batch_index,
        source: format!("begin failed: {e}"),
    })?;

    let result = execute_batch_rows(conn, insert_sql, batch).await;
    match result {
        Ok((rows_altered, bytes_altered)) => {
            conn.commit().await.map_err(|e| IngestError::BatchFailed {
                batch_index,
                source: format!("commit failed: {e}"),
            })?;
            tracing::debug!(
                batch_index,
                rows = batch.len(),
                rows_altered,
                bytes_altered,
                lob_kind = ?batch[0].lob_kind,
                "inserted LOB batch finished"
            );
            Ok(())
        }
        Err(e) => {
            let _ = conn.rollback().await;
            Err(IngestError::BatchFailed {
                batch_index,
                source: e.to_string(),
            }
            .into())
        }
    }
}

async fn execute_batch_rows(
    conn: &mut dyn crate::backend::Connection,
    insert_sql: &str,
    batch: &[&LobRowPlan],
) -> anyhow::Result<(i64, i64)> {
    let mut rows_altered = 0i64;
    let mut bytes_altered = 0i64;

    if let Some(mut stmt) = conn.prepare_in_tx(insert_sql).await? {
        for row in batch {
            let payload = build_payload(row);
            let args = [
                ColumnValue::Int(row.tenant_id as i64),
                ColumnValue::Text(row.doc_type.clone()),
            ];
            rows_altered += stmt.exec_with_payload(&payload, &args).await? as i64;
            bytes_altered += row.lob_bytes;
        }
        stmt.close().await?;
    } else {
        for row in batch {
            let payload = build_payload(row);
            let args = [
                ColumnValue::Int(row.tenant_id as i64),
                ColumnValue::Text(row.doc_type.clone()),
            ];
            rows_altered += conn
                .execute_with_payload(insert_sql, &payload, &args)
                .await? as i64;
            bytes_altered += row.lob_bytes;
        }
    }

    Ok((rows_altered, bytes_altered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lobplan::LobKind;

    fn row(index: u64, kind: LobKind, bytes: i64) -> LobRowPlan {
        LobRowPlan {
            row_index: index,
            tenant_id: 1,
            lob_kind: kind,
            lob_bytes: bytes,
            doc_type: kind.as_str().to_string(),
        }
    }

    #[test]
    fn validate_batch_rejects_mixed_kinds() {
        let a = row(0, LobKind::Blob, 10);
        let b = row(1, LobKind::Clob, 10);
        let batch = vec![&a, &b];
        assert!(validate_batch(0, &batch).is_err());
    }

    #[test]
    fn validate_batch_accepts_uniform_batch() {
        let a = row(0, LobKind::Blob, 10);
        let b = row(1, LobKind::Blob, 20);
        let batch = vec![&a, &b];
        assert!(validate_batch(0, &batch).is_ok());
    }

    #[test]
    fn validate_batch_rejects_negative_size() {
        let mut a = row(0, LobKind::Blob, 10);
        a.lob_bytes = -1;
        let batch = vec![&a];
        assert!(validate_batch(0, &batch).is_err());
    }
}
