pub mod client;
pub mod connection;
pub mod pool;

pub use client::Db2Client;
pub use pool::Db2Pool;
