//! Backend Abstraction (§4.1): a uniform Client / Pool / Connection contract
//! over the DB2 and PostgreSQL drivers, with capability-discovered optional
//! behavior (bulk insert, prepare-in-tx) rather than duck-typed fallbacks —
//! per §9's "polymorphism via capability sets".

pub mod db2;
pub mod isolation;
pub mod postgres;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

pub use isolation::IsolationLevel;

/// A single column value, normalized across backends (DB2 returns
/// upper-cased identifiers; callers see lower-cased column names either way).
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
    Decimal(bigdecimal::BigDecimal),
    Timestamp(chrono::NaiveDateTime),
}

/// One result row: lower-cased column name to value.
pub type Row = HashMap<String, ColumnValue>;

/// The payload argument appended by `execute_with_payload`.
#[derive(Debug, Clone)]
pub enum Payload {
    Bin(Vec<u8>),
    Text(String),
}

/// One row destined for the bulk LOB inserter.
#[derive(Debug, Clone)]
pub struct LobBulkRow {
    pub tenant_id: i32,
    pub doc_type: String,
    pub payload_bin: Option<Vec<u8>>,
    pub payload_text: Option<String>,
}

/// Optional bulk-copy capability (§4.1): PostgreSQL only. A connection that
/// implements this is discovered at runtime via [`Connection::bulk_inserter`].
#[async_trait]
pub trait BulkInserter: Send {
    /// Streams `rows` into `schema.table` as a single transactional bulk
    /// copy, followed by commit. Returns `(rows_copied, bytes_copied)`.
    async fn insert_lob_rows_bulk(
        &mut self,
        schema: &str,
        table: &str,
        rows: Vec<LobBulkRow>,
    ) -> anyhow::Result<(i64, i64)>;
}

/// A handle bound to the connection's current in-transaction scope (§4.1).
#[async_trait]
pub trait PreparedStatement: Send {
    async fn exec_with_payload(
        &mut self,
        payload: &Payload,
        args: &[ColumnValue],
    ) -> anyhow::Result<u64>;

    async fn close(self: Box<Self>) -> anyhow::Result<()>;
}

/// Core per-connection contract (§4.1). A connection is owned by exactly one
/// logical caller for its whole lifetime — no cross-task sharing.
#[async_trait]
pub trait Connection: Send {
    async fn begin(&mut self) -> anyhow::Result<()>;
    async fn commit(&mut self) -> anyhow::Result<()>;
    async fn rollback(&mut self) -> anyhow::Result<()>;
    async fn close(self: Box<Self>) -> anyhow::Result<()>;

    async fn execute(&mut self, sql: &str) -> anyhow::Result<u64>;
    async fn query(&mut self, sql: &str, args: &[ColumnValue]) -> anyhow::Result<Vec<Row>>;

    /// Fails if the result set has 0 or more than 1 row.
    async fn query_one_row(&mut self, sql: &str, args: &[ColumnValue]) -> anyhow::Result<Row> {
        let mut rows = self.query(sql, args).await?;
        match rows.len() {
            1 => Ok(rows.pop().unwrap()),
            0 => Err(anyhow::anyhow!("query_one_row: expected 1 row, got 0")),
            n => Err(anyhow::anyhow!("query_one_row: expected 1 row, got {n}")),
        }
    }

    async fn set_isolation_level(&mut self, level: IsolationLevel) -> anyhow::Result<()>;

    /// Appends `payload` as the trailing positional parameter.
    async fn execute_with_payload(
        &mut self,
        sql: &str,
        payload: &Payload,
        args: &[ColumnValue],
    ) -> anyhow::Result<u64>;

    /// Optional capability: a prepared statement bound to the current
    /// transaction. `Ok(None)` means the backend doesn't support it (DB2
    /// callers fall back to `execute_with_payload`).
    async fn prepare_in_tx(
        &mut self,
        _sql: &str,
    ) -> anyhow::Result<Option<Box<dyn PreparedStatement>>> {
        Ok(None)
    }

    /// Optional capability: bulk LOB insert. `None` means the backend has no
    /// bulk path (DB2 never does; see §4.1).
    fn bulk_inserter(&mut self) -> Option<&mut dyn BulkInserter> {
        None
    }
}

/// A process-local set of reusable physical connections (§3). Each `connect`
/// acquires one owned exclusively by the caller until `close`.
#[async_trait]
pub trait Pool: Send + Sync {
    async fn connect(&self) -> anyhow::Result<Box<dyn Connection>>;
}

/// Top-level backend handle, constructed once per binary from config.
#[async_trait]
pub trait Client: Send + Sync {
    async fn pool(&self) -> anyhow::Result<Arc<dyn Pool>>;
}

/// Which SQL dialect a backend speaks — drives `src/sql/` dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rdbms {
    Postgres,
    Db2,
}
