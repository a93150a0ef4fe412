use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{Client, Pool};
use crate::config::Db2ConnectParams;

use super::pool::Db2Pool;

/// Top-level DB2 backend handle, mirroring `PgClient`'s shape (§4.1). DB2
/// has no teacher or pack precedent; `odbc-api` is a deliberate, documented
/// enrichment (see `DESIGN.md`).
pub struct Db2Client {
    params: Db2ConnectParams,
}

impl Db2Client {
    pub fn new(params: Db2ConnectParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl Client for Db2Client {
    async fn pool(&self) -> anyhow::Result<Arc<dyn Pool>> {
        Ok(Arc::new(Db2Pool::new(self.params.clone())))
    }
}
