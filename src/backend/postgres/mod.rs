//! PostgreSQL backend implementation, built directly on `tokio-postgres`
//! (the teacher already reaches for this crate directly in
//! `src/bin/migrations_tool.rs` and `src/bin/copy_sqlite_media.rs`, including
//! the `copy_in` bulk-copy pattern this module's `BulkInserter` reuses).

pub mod client;
pub mod connection;
pub mod pool;

pub use client::PgClient;
pub use pool::PgPool;
