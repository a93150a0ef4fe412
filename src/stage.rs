//! Staging Driver (§4.11): creates schema/table/index for either the LOB or
//! RU scenario in one transaction, parameterized over [`SqlDialect`] so both
//! share the same code path. Grounded on
//! `original_source/pkg/{lobperformance,ruperformance}/stage.go`'s
//! create-schema/create-table/create-index sequencing.

use crate::backend::Client;
use crate::errors::ConnectError;
use crate::sql::SqlDialect;

/// Which scenario's DDL to stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Lob,
    Ru,
}

pub async fn run(
    client: &dyn Client,
    dialect: &dyn SqlDialect,
    scenario: Scenario,
    schema: &str,
    table: &str,
) -> anyhow::Result<()> {
    let pool = client.pool().await?;
    let mut conn = pool.connect().await?;

    conn.begin()
        .await
        .map_err(|e| ConnectError::Staging(format!("begin failed: {e}")))?;

    let create_schema_sql = match scenario {
        Scenario::Lob => dialect.lob_create_schema_sql(schema),
        Scenario::Ru => dialect.ru_create_schema_sql(schema),
    };
    match conn.execute(&create_schema_sql).await {
        Ok(_) => {
            tracing::info!(schema, "schema created");
        }
        Err(e) => {
            // Idempotent setup warning (§7): "already exists" is non-fatal.
            let msg = e.to_string().to_ascii_lowercase();
            if msg.contains("already exists") {
                tracing::warn!(schema, error = %e, "schema already exists, continuing");
            } else {
                let _ = conn.rollback().await;
                return Err(ConnectError::Staging(format!("create schema failed: {e}")).into());
            }
        }
    }

    let create_table_sql = match scenario {
        Scenario::Lob => dialect.lob_create_table_sql(schema, table),
        Scenario::Ru => dialect.ru_create_table_sql(schema, table),
    };
    if let Err(e) = conn.execute(&create_table_sql).await {
        let _ = conn.rollback().await;
        return Err(ConnectError::Staging(format!("create table failed: {e}")).into());
    }
    tracing::info!(schema, table, "table created");

    if scenario == Scenario::Ru {
        let create_index_sql = dialect.ru_create_index_sql(schema, table);
        if let Err(e) = conn.execute(&create_index_sql).await {
            let _ = conn.rollback().await;
            return Err(ConnectError::Staging(format!("create index failed: {e}")).into());
        }
        tracing::info!(schema, table, "index created");
    }

    conn.commit()
        .await
        .map_err(|e| ConnectError::Staging(format!("commit failed: {e}")))?;
    conn.close().await?;

    tracing::info!(schema, table, scenario = ?scenario, "staging finished");
    Ok(())
}
