//! Closed error taxonomy (spec §7), convertible into `anyhow::Error` at every
//! binary/driver boundary the way the teacher's CLI entry points do.

use thiserror::Error;

/// Invalid CLI argument, malformed byte-size/spread, or a table name with no
/// usable parts. Fatal during startup, before any connection is established.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid byte size {raw:?}: {reason}")]
    InvalidByteSize { raw: String, reason: String },
    #[error("invalid spread {raw:?}: {reason}")]
    InvalidSpread { raw: String, reason: String },
    #[error("table name {raw:?} has no usable table part")]
    EmptyTableName { raw: String },
    #[error("missing required argument: {0}")]
    MissingArgument(String),
    #[error("invalid argument value for {flag}: {reason}")]
    InvalidValue { flag: String, reason: String },
}

/// Spreads not summing to 100%, zero-size buckets, or negative inputs. Fatal;
/// no connection is ever opened for a plan that fails to build.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("bucket percentages sum to {sum:.6}, expected 100 +/- 1e-4")]
    PercentageMismatch { sum: f64 },
    #[error("no spread given and total bytes is non-zero")]
    NoSpreadNonZeroTotal,
    #[error("bucket size must be > 0, got {size}")]
    NonPositiveBucketSize { size: i64 },
    #[error("total bytes must be >= 0, got {total}")]
    NegativeTotal { total: i64 },
    #[error("empty-lob count must be >= 0, got {count}")]
    NegativeEmptyCount { count: i64 },
}

/// Pool init, connect, or staging DDL failure. Fatal.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to connect to backend: {0}")]
    Connect(String),
    #[error("staging DDL failed: {0}")]
    Staging(String),
    #[error("pool initialization failed: {0}")]
    PoolInit(String),
}

/// Per-row or per-batch ingestion failure; the batch transaction is rolled
/// back and the whole run fails.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("batch {batch_index} mixes LOB kinds within one batch")]
    MixedLobKindInBatch { batch_index: usize },
    #[error("negative payload size {size} in batch {batch_index}")]
    NegativeSize { batch_index: usize, size: i64 },
    #[error("batch {batch_index} failed, rolled back: {source}")]
    BatchFailed {
        batch_index: usize,
        source: String,
    },
}

/// A worker returning a non-cancellation error aborts the test; the first
/// such error is surfaced.
#[derive(Debug, Error)]
pub enum TestError {
    #[error("worker failed: {0}")]
    WorkerFailed(String),
    #[error("table is empty, cannot derive an id range")]
    EmptyTable,
    #[error("unsupported LOB kind {0:?}")]
    UnsupportedLobKind(String),
}
