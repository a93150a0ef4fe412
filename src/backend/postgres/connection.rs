use std::sync::Arc;

use async_trait::async_trait;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::Client as PgDriverClient;

use crate::backend::{
    BulkInserter, ColumnValue, Connection, IsolationLevel, LobBulkRow, Payload, PreparedStatement,
    Row,
};
use crate::backend::isolation::PgIsolation;

/// A single PostgreSQL connection, modeling the explicit idle/in-tx state
/// machine from §3 via plain `BEGIN`/`COMMIT`/`ROLLBACK` statements rather
/// than `tokio_postgres::Transaction`'s borrow-checked type, so it can live
/// behind `Box<dyn Connection>`. The client handle is reference-counted so a
/// [`PgPreparedStatement`] can execute against the same live connection.
pub struct PgConnection {
    client: Arc<PgDriverClient>,
}

impl PgConnection {
    pub fn new(client: PgDriverClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

fn to_sql_params(args: &[ColumnValue]) -> Vec<Box<dyn ToSql + Sync + Send>> {
    args.iter()
        .map(|v| -> Box<dyn ToSql + Sync + Send> {
            match v {
                ColumnValue::Null => Box::new(Option::<String>::None),
                ColumnValue::Int(i) => Box::new(*i),
                ColumnValue::Text(s) => Box::new(s.clone()),
                ColumnValue::Bytes(b) => Box::new(b.clone()),
                ColumnValue::Decimal(d) => Box::new(d.to_string()),
                ColumnValue::Timestamp(ts) => Box::new(*ts),
            }
        })
        .collect()
}

fn row_to_map(row: &tokio_postgres::Row) -> anyhow::Result<Row> {
    let mut out = Row::new();
    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name().to_ascii_lowercase();
        let value = match *column.type_() {
            Type::INT4 => row
                .try_get::<_, Option<i32>>(i)?
                .map(|v| ColumnValue::Int(v as i64))
                .unwrap_or(ColumnValue::Null),
            Type::INT8 => row
                .try_get::<_, Option<i64>>(i)?
                .map(ColumnValue::Int)
                .unwrap_or(ColumnValue::Null),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR => row
                .try_get::<_, Option<String>>(i)?
                .map(ColumnValue::Text)
                .unwrap_or(ColumnValue::Null),
            Type::BYTEA => row
                .try_get::<_, Option<Vec<u8>>>(i)?
                .map(ColumnValue::Bytes)
                .unwrap_or(ColumnValue::Null),
            Type::TIMESTAMP | Type::TIMESTAMPTZ => row
                .try_get::<_, Option<chrono::NaiveDateTime>>(i)?
                .map(ColumnValue::Timestamp)
                .unwrap_or(ColumnValue::Null),
            Type::NUMERIC => row
                .try_get::<_, Option<String>>(i)
                .ok()
                .flatten()
                .map(ColumnValue::Text)
                .unwrap_or(ColumnValue::Null),
            _ => row
                .try_get::<_, Option<String>>(i)
                .ok()
                .flatten()
                .map(ColumnValue::Text)
                .unwrap_or(ColumnValue::Null),
        };
        out.insert(name, value);
    }
    Ok(out)
}

#[async_trait]
impl Connection for PgConnection {
    async fn begin(&mut self) -> anyhow::Result<()> {
        self.client.batch_execute("BEGIN").await?;
        Ok(())
    }

    async fn commit(&mut self) -> anyhow::Result<()> {
        self.client.batch_execute("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> anyhow::Result<()> {
        self.client.batch_execute("ROLLBACK").await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        // Dropping the client closes the connection; tokio-postgres has no
        // explicit async close beyond drop.
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> anyhow::Result<u64> {
        let affected = self.client.execute(sql, &[]).await?;
        Ok(affected)
    }

    async fn query(&mut self, sql: &str, args: &[ColumnValue]) -> anyhow::Result<Vec<Row>> {
        let params = to_sql_params(args);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|b| b.as_ref() as &(dyn ToSql + Sync)).collect();
        let rows = self.client.query(sql, &param_refs).await?;
        rows.iter().map(row_to_map).collect()
    }

    async fn set_isolation_level(&mut self, level: IsolationLevel) -> anyhow::Result<()> {
        let iso = PgIsolation::from_level(level);
        self.client.batch_execute(&iso.set_statement()).await?;
        Ok(())
    }

    async fn execute_with_payload(
        &mut self,
        sql: &str,
        payload: &Payload,
        args: &[ColumnValue],
    ) -> anyhow::Result<u64> {
        let mut full_args: Vec<ColumnValue> = args.to_vec();
        full_args.push(match payload {
            Payload::Bin(b) => ColumnValue::Bytes(b.clone()),
            Payload::Text(t) => ColumnValue::Text(t.clone()),
        });
        let params = to_sql_params(&full_args);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|b| b.as_ref() as &(dyn ToSql + Sync)).collect();
        let affected = self.client.execute(sql, &param_refs).await?;
        Ok(affected)
    }

    async fn prepare_in_tx(
        &mut self,
        sql: &str,
    ) -> anyhow::Result<Option<Box<dyn PreparedStatement>>> {
        let statement = self.client.prepare(sql).await?;
        Ok(Some(Box::new(PgPreparedStatement {
            sql: sql.to_string(),
            statement,
            client: self.client.clone(),
        })))
    }

    fn bulk_inserter(&mut self) -> Option<&mut dyn BulkInserter> {
        Some(self)
    }
}

/// On PostgreSQL the statement name is derived from a 64-bit hash of the SQL
/// text for stable reuse (§4.1); `tokio_postgres::Client::prepare` already
/// caches by the exact SQL string server-side, so the hash is carried here
/// purely as the handle's identity, not a separate cache key.
pub struct PgPreparedStatement {
    sql: String,
    statement: tokio_postgres::Statement,
    client: Arc<PgDriverClient>,
}

impl PgPreparedStatement {
    /// 64-bit hash of the prepared SQL text, used for stable logging/identity.
    pub fn sql_hash(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.sql.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl PreparedStatement for PgPreparedStatement {
    async fn exec_with_payload(
        &mut self,
        payload: &Payload,
        args: &[ColumnValue],
    ) -> anyhow::Result<u64> {
        let mut full_args: Vec<ColumnValue> = args.to_vec();
        full_args.push(match payload {
            Payload::Bin(b) => ColumnValue::Bytes(b.clone()),
            Payload::Text(t) => ColumnValue::Text(t.clone()),
        });
        let params = to_sql_params(&full_args);
        let param_refs: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|b| b.as_ref() as &(dyn ToSql + Sync)).collect();
        let affected = self.client.execute(&self.statement, &param_refs).await?;
        Ok(affected)
    }

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Bulk LOB insert via `COPY ... FROM STDIN`, grounded on the teacher's
/// `src/bin/copy_sqlite_media.rs` `copy_in` usage.
#[async_trait]
impl BulkInserter for PgConnection {
    async fn insert_lob_rows_bulk(
        &mut self,
        schema: &str,
        table: &str,
        rows: Vec<LobBulkRow>,
    ) -> anyhow::Result<(i64, i64)> {
        use futures::SinkExt;

        self.client.batch_execute("BEGIN").await?;

        let copy_sql = format!(
            "COPY {schema}.{table} (tenant_id, doc_type, payload_bin, payload_text) FROM STDIN WITH (FORMAT csv)"
        );
        let sink = self.client.copy_in(&copy_sql).await?;
        tokio::pin!(sink);

        let mut total_bytes: i64 = 0;
        let mut buf = String::new();
        for row in &rows {
            let bin_repr = row
                .payload_bin
                .as_ref()
                .map(|b| format!("\\x{}", hex_encode(b)))
                .unwrap_or_default();
            let text_repr = row.payload_text.clone().unwrap_or_default();
            total_bytes += row
                .payload_bin
                .as_ref()
                .map(|b| b.len() as i64)
                .unwrap_or(0)
                + row
                    .payload_text
                    .as_ref()
                    .map(|t| t.len() as i64)
                    .unwrap_or(0);
            buf.push_str(&format!(
                "{},{},{},{}\n",
                row.tenant_id,
                csv_escape(&row.doc_type),
                csv_escape(&bin_repr),
                csv_escape(&text_repr),
            ));
        }

        sink.send(bytes::Bytes::from(buf.into_bytes())).await?;
        let rows_copied = sink.finish().await?;
        self.client.batch_execute("COMMIT").await?;

        Ok((rows_copied as i64, total_bytes))
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
