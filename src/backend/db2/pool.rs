use std::sync::OnceLock;

use async_trait::async_trait;
use odbc_api::{ConnectionOptions, Environment};

use crate::backend::{Connection, Pool};
use crate::config::Db2ConnectParams;

use super::connection::Db2Connection;

/// `odbc-api` requires exactly one `Environment` per process; it is not
/// reconstructible per-pool, so it lives behind a process-wide `OnceLock`
/// and every connection borrows the same `'static` handle.
static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> &'static Environment {
    ENVIRONMENT.get_or_init(|| Environment::new().expect("failed to initialize ODBC environment"))
}

/// A process-local dispenser of DB2 connections. `odbc-api` is a blocking
/// driver; every connection attempt runs on the blocking thread pool via
/// `tokio::task::spawn_blocking` so it never stalls the async reactor.
pub struct Db2Pool {
    params: Db2ConnectParams,
}

impl Db2Pool {
    pub fn new(params: Db2ConnectParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl Pool for Db2Pool {
    async fn connect(&self) -> anyhow::Result<Box<dyn Connection>> {
        let conn_string = self.params.to_odbc_conn_string();
        let conn = tokio::task::spawn_blocking(move || {
            environment().connect_with_connection_string(&conn_string, ConnectionOptions::default())
        })
        .await
        .map_err(|e| anyhow::anyhow!("db2 connect task panicked: {e}"))?
        .map_err(|e| anyhow::anyhow!("db2 connect failed: {e}"))?;

        Ok(Box::new(Db2Connection::new(conn)?))
    }
}
