//! Per-backend DDL/DML string builders (§4.2), grounded on
//! `original_source/pkg/lobperformance/{pg_helper,db2_helper}.go` and
//! `original_source/pkg/ruperformance/{pg_helper,db2_helper}.go`.
pub mod db2;
pub mod postgres;

use crate::errors::ConfigError;

/// A payload column for a LOB row, chosen by `lobType` (`blob`/`bytea` →
/// binary, `clob`/`text` → text).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobColumn {
    Bin,
    Text,
}

pub fn payload_column_for_lob_type(lob_type: &str) -> Result<LobColumn, ConfigError> {
    match lob_type.to_ascii_lowercase().as_str() {
        "clob" | "text" => Ok(LobColumn::Text),
        "blob" | "bytea" => Ok(LobColumn::Bin),
        other => Err(ConfigError::InvalidValue {
            flag: "lobType".to_string(),
            reason: format!("unsupported lobType {other:?}"),
        }),
    }
}

/// Backend-specific SQL text for the LOB performance and RU performance
/// scenarios. One implementation per RDBMS (`postgres::PgDialect`,
/// `db2::Db2Dialect`), mirroring the Go `PgHelper`/`Db2Helper` split.
pub trait SqlDialect: Send + Sync {
    fn lob_create_schema_sql(&self, schema: &str) -> String;
    fn lob_create_table_sql(&self, schema: &str, table: &str) -> String;
    fn lob_insert_one_row_sql(&self, schema: &str, table: &str, lob_type: &str) -> Result<String, ConfigError>;

    /// The backend-cased column name actually returned in result rows
    /// (lower-case on PostgreSQL, upper-case on DB2 — §4.1 requires callers
    /// normalize to lower-case, so this is the pre-normalization name used to
    /// build SQL text only).
    fn lob_payload_column_name(&self, lob_type: &str) -> Result<String, ConfigError>;
    fn lob_select_by_id_sql(&self, schema: &str, table: &str, lob_type: &str) -> Result<String, ConfigError>;
    fn lob_select_min_max_id_sql(&self, schema: &str, table: &str) -> String;

    fn ru_create_schema_sql(&self, schema: &str) -> String;
    fn ru_create_table_sql(&self, schema: &str, table: &str) -> String;
    fn ru_create_index_sql(&self, schema: &str, table: &str) -> String;
    fn ru_insert_sql_prefix(&self, schema: &str, table: &str) -> String;
    fn ru_olap_sql(&self, schema: &str, table: &str) -> String;
    fn ru_oltp_sql(&self, schema: &str, table: &str, acct_id: i64) -> String;

    /// RDBMS-specific timestamp literal for the multi-row RU insert text
    /// built in `ru::gen` (§4.9); DB2 and PostgreSQL use different literal
    /// syntaxes for an otherwise identical `INSERT ... VALUES` statement.
    fn ru_timestamp_literal(&self, ts: chrono::NaiveDateTime) -> String;

    /// Row-locking SELECT used by the consistency probe (§4.12) to hold the
    /// hot-account range locked across conn1's transaction.
    fn ru_lock_rows_sql(&self, schema: &str, table: &str) -> String;
}
