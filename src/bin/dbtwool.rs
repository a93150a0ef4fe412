//! `dbtwool`: DB2-target entry point. Parses the shared CLI surface
//! ([`dbtwool::cliopts`]) and dispatches into the scenario drivers using the
//! DB2 backend and dialect.

use clap::Parser;

use dbtwool::backend::db2::Db2Client;
use dbtwool::backend::IsolationLevel;
use dbtwool::cliopts::{Cli, Command, LobPerformanceCommand, RuPerformanceCommand};
use dbtwool::config::{self, ConfigFile, Db2ConnectParams};
use dbtwool::randgen::RandMode;
use dbtwool::sql::db2::Db2Dialect;
use dbtwool::{consistency, lob, logging, ru, stage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    logging::init_tracing("info")?;

    let cli = Cli::parse();
    let file = cli
        .cfg_file
        .as_ref()
        .map(|path| ConfigFile::load(path))
        .transpose()?;

    let client = Db2Client::new(Db2ConnectParams::from_env());
    let dialect = Db2Dialect;

    match cli.command {
        Command::Consistency {
            isolation_level,
            table,
        } => {
            let isolation_level =
                config::resolve_parsed(isolation_level, "isolation-level", None, file.as_ref(), 0u8);
            let table = config::resolve_opt(table, "table", None, file.as_ref(), Some("ru_perf"))
                .unwrap_or_else(|| "ru_perf".to_string());
            let (schema, table) = config::split_schema_table(&table)?;
            consistency::run(
                &client,
                &dialect,
                &schema,
                &table,
                IsolationLevel(isolation_level),
            )
            .await?;
        }
        Command::LobPerformance(action) => run_lob(&client, &dialect, action, file.as_ref()).await?,
        Command::RuPerformance(action) => run_ru(&client, &dialect, action, file.as_ref()).await?,
    }

    Ok(())
}

async fn run_lob(
    client: &Db2Client,
    dialect: &Db2Dialect,
    action: LobPerformanceCommand,
    file: Option<&ConfigFile>,
) -> anyhow::Result<()> {
    match action {
        LobPerformanceCommand::Stage { table } => {
            let table = config::resolve_required(table, "table", file)?;
            let (schema, table) = config::split_schema_table(&table)?;
            stage::run(client, dialect, stage::Scenario::Lob, &schema, &table).await?;
        }
        LobPerformanceCommand::Gen {
            table,
            spread,
            byte_size,
            empty_lobs,
            lob_type,
            batch_size,
        } => {
            let table = config::resolve_required(table, "table", file)?;
            let (schema, table) = config::split_schema_table(&table)?;
            let spread = config::resolve_spread(spread, file);
            let byte_size = config::resolve_required(byte_size, "byte-size", file)?;
            let empty_lobs = config::resolve_parsed(empty_lobs, "empty-lobs", None, file, 0i64);
            let lob_type = config::resolve_required(lob_type, "lob-type", file)?;
            let batch_size =
                config::resolve_parsed(batch_size, "batch-size", None, file, 100usize);
            lob::ingest::run(
                client,
                dialect,
                &schema,
                &table,
                &spread,
                empty_lobs,
                &byte_size,
                batch_size,
                &lob_type,
            )
            .await?;
        }
        LobPerformanceCommand::Test {
            table,
            parallel,
            warmup_time,
            execution_time,
            read_mode,
            lob_type,
            randomizer_seed,
        } => {
            let table = config::resolve_required(table, "table", file)?;
            let (schema, table) = config::split_schema_table(&table)?;
            let parallel = config::resolve_parsed(parallel, "parallel", None, file, 4u32);
            let warmup_time =
                config::resolve_parsed(warmup_time, "warmup-time", None, file, 10u64);
            let execution_time =
                config::resolve_parsed(execution_time, "execution-time", None, file, 20u64);
            let read_mode = config::resolve_opt(
                read_mode,
                "read-mode",
                None,
                file,
                Some("scattered"),
            )
            .unwrap_or_else(|| "scattered".to_string());
            let lob_type = config::resolve_required(lob_type, "lob-type", file)?;
            let randomizer_seed =
                config::resolve_parsed(randomizer_seed, "randomizer-seed", None, file, 0i64);

            let mode = RandMode::parse(&read_mode).ok_or_else(|| {
                anyhow::anyhow!("invalid --readMode {read_mode:?}, expected sequential|scattered")
            })?;
            let report = lob::read_test::run(
                client,
                dialect,
                &schema,
                &table,
                randomizer_seed,
                parallel,
                warmup_time,
                execution_time,
                mode,
                &lob_type,
            )
            .await?;
            tracing::info!(
                reads = report.reads,
                reads_per_second = report.reads_per_second,
                "lob read test complete"
            );
            println!(
                "reads={} reads_per_second={:.2}",
                report.reads, report.reads_per_second
            );
        }
    }
    Ok(())
}

async fn run_ru(
    client: &Db2Client,
    dialect: &Db2Dialect,
    action: RuPerformanceCommand,
    file: Option<&ConfigFile>,
) -> anyhow::Result<()> {
    match action {
        RuPerformanceCommand::Stage { table } => {
            let table = config::resolve_required(table, "table", file)?;
            let (schema, table) = config::split_schema_table(&table)?;
            stage::run(client, dialect, stage::Scenario::Ru, &schema, &table).await?;
        }
        RuPerformanceCommand::Gen { table, num_of_rows } => {
            let table = config::resolve_required(table, "table", file)?;
            let (schema, table) = config::split_schema_table(&table)?;
            let num_of_rows = config::resolve_required_parsed(num_of_rows, "num-of-rows", file)?;
            ru::gen::run(client, dialect, &schema, &table, num_of_rows).await?;
        }
        RuPerformanceCommand::Test {
            table,
            warmup_time,
            execution_time,
            isolation_level,
        } => {
            let table = config::resolve_required(table, "table", file)?;
            let (schema, table) = config::split_schema_table(&table)?;
            let warmup_time =
                config::resolve_parsed(warmup_time, "warmup-time", None, file, 10u64);
            let execution_time =
                config::resolve_parsed(execution_time, "execution-time", None, file, 20u64);
            let isolation_level =
                config::resolve_parsed(isolation_level, "isolation-level", None, file, 0u8);
            let report = ru::test::run(
                client,
                dialect,
                &schema,
                &table,
                warmup_time,
                execution_time,
                IsolationLevel(isolation_level),
            )
            .await?;
            tracing::info!(
                oltp_ops = report.oltp_ops,
                olap_completed = report.olap_completed,
                olap_per_second = report.olap_per_second,
                "ru test complete"
            );
            println!(
                "oltp_ops={} olap_completed={} olap_per_second={:.2}",
                report.oltp_ops, report.olap_completed, report.olap_per_second
            );
        }
    }
    Ok(())
}
