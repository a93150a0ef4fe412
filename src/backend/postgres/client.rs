use std::sync::Arc;

use async_trait::async_trait;

use crate::backend::{Client, Pool};
use crate::config::PgConnectParams;

use super::pool::PgPool;

/// Top-level PostgreSQL backend handle. Grounded on the teacher's
/// `src/bin/migrations_tool.rs` connect-string construction.
pub struct PgClient {
    params: PgConnectParams,
}

impl PgClient {
    pub fn new(params: PgConnectParams) -> Self {
        Self { params }
    }
}

#[async_trait]
impl Client for PgClient {
    async fn pool(&self) -> anyhow::Result<Arc<dyn Pool>> {
        Ok(Arc::new(PgPool::new(self.params.clone())))
    }
}
