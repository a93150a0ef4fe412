//! Shared CLI surface (§6) for both `dbtwool` (DB2) and `pgtwool`
//! (PostgreSQL) binaries — the two targets differ only in which backend they
//! construct from the parsed flags, so the `clap` definitions live here once.
//!
//! Every flag that spec §6 allows a `PGC_<FLAG>`/`--cfgFile` fallback for is
//! left as `Option<T>` here, with no `default_value`/`default_value_t` —
//! clap only captures "did the user pass this flag". The actual CLI > env >
//! config-file > built-in-default precedence chain is resolved afterward in
//! each binary's `main()` via `config::resolve_opt`/`resolve_parsed`.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(about = "Relational database benchmark harness")]
pub struct Cli {
    /// Optional TOML config file, consulted as a fallback default for any flag.
    #[arg(short = 'c', long = "cfgFile", global = true)]
    pub cfg_file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Runs the two-transaction consistency probe against a RU-shaped table.
    Consistency {
        #[arg(long = "isolationLevel")]
        isolation_level: Option<u8>,
        #[arg(long)]
        table: Option<String>,
    },
    /// LOB ingest/read-throughput scenario.
    #[command(name = "lob-performance", subcommand)]
    LobPerformance(LobPerformanceCommand),
    /// RU (OLTP+OLAP) isolation-level scenario.
    #[command(name = "ru-performance", subcommand)]
    RuPerformance(RuPerformanceCommand),
}

#[derive(Subcommand, Debug)]
pub enum LobPerformanceCommand {
    /// Creates the LOB table.
    Stage {
        #[arg(long)]
        table: Option<String>,
    },
    /// Ingests synthetic LOB rows per the given size spread.
    Gen {
        #[arg(long)]
        table: Option<String>,
        /// `<percent>%:<size>`, repeatable; forms the size distribution.
        #[arg(long)]
        spread: Vec<String>,
        #[arg(long = "byteSize")]
        byte_size: Option<String>,
        #[arg(long = "emptyLobs")]
        empty_lobs: Option<i64>,
        #[arg(long = "lobType")]
        lob_type: Option<String>,
        #[arg(long = "batchSize")]
        batch_size: Option<usize>,
    },
    /// Measures read-by-id throughput for a warmup+execution window.
    Test {
        #[arg(long)]
        table: Option<String>,
        #[arg(long)]
        parallel: Option<u32>,
        #[arg(long = "warmupTime")]
        warmup_time: Option<u64>,
        #[arg(long = "executionTime")]
        execution_time: Option<u64>,
        #[arg(long = "readMode")]
        read_mode: Option<String>,
        #[arg(long = "lobType")]
        lob_type: Option<String>,
        #[arg(long = "randomizerSeed")]
        randomizer_seed: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RuPerformanceCommand {
    /// Creates the RU table and its `(acct_id, txn_ts)` index.
    Stage {
        #[arg(long)]
        table: Option<String>,
    },
    /// Generates `numOfRows` synthetic OLTP rows, skewed toward hot accounts.
    Gen {
        #[arg(long)]
        table: Option<String>,
        #[arg(long = "numOfRows")]
        num_of_rows: Option<u64>,
    },
    /// Runs the OLTP-writer/OLAP-reader mix under a chosen isolation level.
    Test {
        #[arg(long)]
        table: Option<String>,
        #[arg(long = "warmupTime")]
        warmup_time: Option<u64>,
        #[arg(long = "executionTime")]
        execution_time: Option<u64>,
        #[arg(long = "isolationLevel")]
        isolation_level: Option<u8>,
    },
}
