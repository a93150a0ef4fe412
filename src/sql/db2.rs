use crate::errors::ConfigError;

use super::{payload_column_for_lob_type, LobColumn, SqlDialect};

/// DB2 SQL text, grounded on
/// `original_source/pkg/{lobperformance,ruperformance}/db2_helper.go`.
///
/// The original Go `Db2Helper.InsertOneRowSql` is an unimplemented stub
/// (`return "", nil`) — DB2 LOB rows there are only ever written through the
/// bulk path. Since `bulk_inserter()` returns `None` for DB2 here (§4.1,
/// no ODBC bulk-copy API is wired up), a real parameterized single-row
/// INSERT is needed as the prepared-statement fallback; it is built the same
/// way as `PgDialect`'s, using ODBC `?` placeholders instead of `$n`.
pub struct Db2Dialect;

impl SqlDialect for Db2Dialect {
    fn lob_create_schema_sql(&self, schema: &str) -> String {
        format!("CREATE SCHEMA {schema};")
    }

    fn lob_create_table_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "CREATE TABLE {schema}.{table} (\n\
  ID            BIGINT NOT NULL GENERATED ALWAYS AS IDENTITY (START WITH 1, INCREMENT BY 1),\n\
  TENANT_ID     INTEGER NOT NULL,\n\
  CREATED_AT    TIMESTAMP NOT NULL DEFAULT CURRENT TIMESTAMP,\n\
  UPDATED_AT    TIMESTAMP NOT NULL DEFAULT CURRENT TIMESTAMP,\n\
  DOC_TYPE      VARCHAR(64) NOT NULL,\n\
  PAYLOAD_BIN   BLOB(50M),\n\
  PAYLOAD_TEXT  CLOB(50M),\n\
  CONSTRAINT PK_LOB_PERF PRIMARY KEY (ID)\n\
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
            LobColumn::Bin => "PAYLOAD_BIN",
            LobColumn::Text => "PAYLOAD_TEXT",
        };
        Ok(format!(
            "INSERT INTO {schema}.{table} (TENANT_ID, DOC_TYPE, {col}) VALUES (?, ?, ?)"
        ))
    }

    fn lob_payload_column_name(&self, lob_type: &str) -> Result<String, ConfigError> {
        Ok(match payload_column_for_lob_type(lob_type)? {
            LobColumn::Bin => "PAYLOAD_BIN".to_string(),
            LobColumn::Text => "PAYLOAD_TEXT".to_string(),
        })
    }

    fn lob_select_by_id_sql(
        &self,
        schema: &str,
        table: &str,
        lob_type: &str,
    ) -> Result<String, ConfigError> {
        let col = self.lob_payload_column_name(lob_type)?;
        Ok(format!("SELECT {col} FROM {schema}.{table} WHERE ID = ?"))
    }

    fn lob_select_min_max_id_sql(&self, schema: &str, table: &str) -> String {
        format!("SELECT MIN(ID) AS MIN_ID, MAX(ID) AS MAX_ID FROM {schema}.{table}")
    }

    fn ru_create_schema_sql(&self, schema: &str) -> String {
        format!("CREATE SCHEMA {schema};")
    }

    fn ru_create_table_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "CREATE TABLE {schema}.{table} (\n\
    acct_id     INTEGER NOT NULL,\n\
    txn_ts      TIMESTAMP NOT NULL,\n\
    amount      DECIMAL(12,2) NOT NULL,\n\
    descr      CHAR(100) NOT NULL\n\
)\nORGANIZE BY ROW;"
        )
    }

    fn ru_create_index_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "CREATE INDEX index_account_transaction_acct\n    ON {schema}.{table} (acct_id, txn_ts);"
        )
    }

    fn ru_insert_sql_prefix(&self, schema: &str, table: &str) -> String {
        // The original `Db2Helper.CreateInserSQLPrefix` (ODBC `?` placeholders,
        // a `filler` column) is dead code in the original Go source: the
        // actual generator (`ruperformance/gen.go`) builds one literal
        // multi-row INSERT with `descr`, identical in shape to PostgreSQL's,
        // varying only the timestamp literal syntax. That's what's followed
        // here instead of the unused helper.
        format!("INSERT INTO {schema}.{table} (acct_id, txn_ts, amount, descr) VALUES ")
    }

    fn ru_olap_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "SELECT COUNT(*) AS cnt, SUM(amount) AS total_amt\nFROM   {schema}.{table}\nWHERE  acct_id BETWEEN 1 AND 50\n  AND  txn_ts >= (CURRENT TIMESTAMP - 30 MINUTES)"
        )
    }

    fn ru_oltp_sql(&self, schema: &str, table: &str, acct_id: i64) -> String {
        format!(
            "UPDATE {schema}.{table}\n   SET amount = amount + 1.00\n WHERE acct_id = {acct_id}\n   AND txn_ts >= (CURRENT TIMESTAMP - 30 MINUTES)"
        )
    }

    fn ru_lock_rows_sql(&self, schema: &str, table: &str) -> String {
        format!(
            "SELECT acct_id FROM {schema}.{table} WHERE acct_id BETWEEN 1 AND 50 FOR UPDATE WITH RS"
        )
    }

    fn ru_timestamp_literal(&self, ts: chrono::NaiveDateTime) -> String {
        format!("TIMESTAMP('{}')", ts.format("%Y-%m-%d-%H.%M.%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lob_insert_sql_picks_the_right_column() {
        let d = Db2Dialect;
        assert!(d
            .lob_insert_one_row_sql("s", "t", "clob")
            .unwrap()
            .contains("PAYLOAD_TEXT"));
        assert!(d
            .lob_insert_one_row_sql("s", "t", "blob")
            .unwrap()
            .contains("PAYLOAD_BIN"));
    }

    #[test]
    fn select_by_id_sql_uses_question_mark_placeholder() {
        let d = Db2Dialect;
        assert!(d
            .lob_select_by_id_sql("s", "t", "blob")
            .unwrap()
            .ends_with("WHERE ID = ?"));
    }

    #[test]
    fn ru_insert_prefix_matches_the_actual_generator_columns() {
        let d = Db2Dialect;
        let sql = d.ru_insert_sql_prefix("s", "t");
        assert!(sql.contains("(acct_id, txn_ts, amount, descr)"));
    }

    #[test]
    fn ru_lock_rows_sql_uses_with_rs() {
        let d = Db2Dialect;
        assert!(d.ru_lock_rows_sql("s", "t").ends_with("FOR UPDATE WITH RS"));
    }

    #[test]
    fn ru_timestamp_literal_uses_db2_dash_dot_format() {
        use chrono::NaiveDate;
        let d = Db2Dialect;
        let ts = NaiveDate::from_ymd_opt(2026, 7, 26)
            .unwrap()
            .and_hms_opt(1, 2, 3)
            .unwrap();
        assert_eq!(d.ru_timestamp_literal(ts), "TIMESTAMP('2026-07-26-01.02.03')");
    }
}
