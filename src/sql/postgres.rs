use crate::errors::ConfigError;

use super::{payload_column_for_lob_type, LobColumn, SqlDialect};

/// PostgreSQL SQL text, grounded on
/// `original_source/pkg/{lobperformance,ruperformance}/pg_helper.go`.
pub struct PgDialect;

impl SqlDialect for PgDialect {
    fn lob_create_schema_sql(&self, schema: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {schema};")
    }

    fn lob_create_table_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {schema}.{table} (\n\
  id            bigserial PRIMARY KEY,\n\
  tenant_id     integer NOT NULL,\n\
  created_at    timestamptz NOT NULL DEFAULT now(),\n\
  updated_at    timestamptz NOT NULL DEFAULT now(),\n\
  doc_type      text NOT NULL,\n\
  payload_bin   bytea,\n\
  payload_text  text\n\
);"
        )
    }

    fn lob_insert_one_row_sql(
        &self,
        schema: &str,
        table: &str,
        lob_type: &str,
    ) -> Result<String, ConfigError> {
        let col = match payload_column_for_lob_type(lob_type)? {
            LobColumn::Bin => "payload_bin",
            LobColumn::Text => "payload_text",
        };
        Ok(format!(
            "INSERT INTO {schema}.{table} (tenant_id, doc_type, {col})\nVALUES ($1, $2, $3);"
        ))
    }

    fn lob_payload_column_name(&self, lob_type: &str) -> Result<String, ConfigError> {
        Ok(match payload_column_for_lob_type(lob_type)? {
            LobColumn::Bin => "payload_bin".to_string(),
            LobColumn::Text => "payload_text".to_string(),
        })
    }

    fn lob_select_by_id_sql(
        &self,
        schema: &str,
        table: &str,
        lob_type: &str,
    ) -> Result<String, ConfigError> {
        let col = self.lob_payload_column_name(lob_type)?;
        Ok(format!("SELECT {col} FROM {schema}.{table} WHERE id = $1"))
    }

    fn lob_select_min_max_id_sql(&self, schema: &str, table: &str) -> String {
        format!("SELECT MIN(id) AS min_id, MAX(id) AS max_id FROM {schema}.{table}")
    }

    fn ru_create_schema_sql(&self, schema: &str) -> String {
        format!("CREATE SCHEMA IF NOT EXISTS {schema};")
    }

    fn ru_create_table_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "CREATE TABLE {schema}.{table} (\n\
    acct_id   INTEGER NOT NULL,\n\
    txn_ts    TIMESTAMPTZ NOT NULL,\n\
    amount    NUMERIC(12,2) NOT NULL,\n\
    descr     VARCHAR(100) NOT NULL\n\
);"
        )
    }

    fn ru_create_index_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "CREATE INDEX index_account_transaction_acct_{table}\n    ON {schema}.{table} (acct_id, txn_ts);"
        )
    }

    fn ru_insert_sql_prefix(&self, schema: &str, table: &str) -> String {
        format!("INSERT INTO {schema}.{table} (acct_id, txn_ts, amount, descr) VALUES ")
    }

    fn ru_olap_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "SELECT COUNT(*) AS cnt, SUM(amount) AS total_amt\nFROM   {schema}.{table}\nWHERE  acct_id BETWEEN 1 AND 50\n  AND  txn_ts >= (CURRENT_TIMESTAMP - INTERVAL '30 minutes')"
        )
    }

    fn ru_oltp_sql(&self, schema: &str, table: &str, acct_id: i64) -> String {
        format!(
            "UPDATE {schema}.{table}\n   SET amount = amount + 1.00\n WHERE acct_id = {acct_id}\n   AND txn_ts >= (CURRENT_TIMESTAMP - INTERVAL '30 minutes')"
        )
    }

    fn ru_lock_rows_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "SELECT acct_id FROM {schema}.{table} WHERE acct_id BETWEEN 1 AND 50 FOR UPDATE"
        )
    }

    fn ru_timestamp_literal(&self, ts: chrono::NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", ts.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lob_insert_sql_picks_the_right_column() {
        let d = PgDialect;
        assert!(d
            .lob_insert_one_row_sql("s", "t", "clob")
            .unwrap()
            .contains("payload_text"));
        assert!(d
            .lob_insert_one_row_sql("s", "t", "blob")
            .unwrap()
            .contains("payload_bin"));
        assert!(d.lob_insert_one_row_sql("s", "t", "nope").is_err());
    }

    #[test]
    fn select_by_id_sql_uses_dollar_placeholder() {
        let d = PgDialect;
        assert!(d
            .lob_select_by_id_sql("s", "t", "clob")
            .unwrap()
            .ends_with("WHERE id = $1"));
    }

    #[test]
    fn ru_oltp_sql_interpolates_the_account_id() {
        let d = PgDialect;
        assert!(d.ru_oltp_sql("s", "t", 42).contains("acct_id = 42"));
    }
}
