use async_trait::async_trait;
use tokio_postgres::NoTls;

use crate::backend::{Connection, Pool};
use crate::config::PgConnectParams;

use super::connection::PgConnection;

/// A process-local dispenser of PostgreSQL connections. Each `connect` spawns
/// the connection's background I/O driver task, matching the teacher's
/// `tokio_postgres::connect(...)` + `tokio::spawn(connection.await)` idiom in
/// `src/bin/migrations_tool.rs`.
pub struct PgPool {
    params: PgConnectParams,
}

impl PgPool {
    pub fn new(params: PgConnectParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl Pool for PgPool {
    async fn connect(&self) -> anyhow::Result<Box<dyn Connection>> {
        let conn_string = self.params.to_conn_string();
        let (client, connection) = tokio_postgres::connect(&conn_string, NoTls)
            .await
            .map_err(|e| anyhow::anyhow!("postgres connect failed: {e}"))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection driver task failed");
            }
        });

        Ok(Box::new(PgConnection::new(client)))
    }
}
