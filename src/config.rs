//! Configuration layering: CLI flag > env var (`PGC_<FLAG>` or backend-specific)
//! > optional TOML config file (`--cfgFile`/`-c`) > built-in default.
//!
//! Mirrors the teacher's `src/util/env.rs` getter shapes (`env_opt`/`env_parse`/
//! `env_flag`), narrowed to the handful of variables this crate actually reads.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::ConfigError;

/// Default schema used when a `--table` flag carries no `schema.` prefix.
pub const DEFAULT_SCHEMA: &str = "dbtwooltests";

/// Optional TOML config file, read once at CLI startup. Every field is a flat
/// `flag-name = value` mapping (kebab-case keys matching the CLI flags).
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(flatten)]
    pub values: HashMap<String, toml::Value>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading config file {}: {e}", path.display()))?;
        let parsed: ConfigFile = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("parsing config file {}: {e}", path.display()))?;
        Ok(parsed)
    }

    fn get_str(&self, flag: &str) -> Option<String> {
        self.values.get(flag).and_then(|v| match v {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Integer(i) => Some(i.to_string()),
            toml::Value::Float(f) => Some(f.to_string()),
            toml::Value::Boolean(b) => Some(b.to_string()),
            _ => None,
        })
    }
}

/// Converts a CLI flag's long name (`kebab-case`, e.g. `warmup-time`) into the
/// `PGC_<UPPER_SNAKE_CASE>` env var name the original tool consults as a
/// fallback default for any flag (e.g. `PGC_WARMUP_TIME`).
pub fn pgc_env_name(flag: &str) -> String {
    format!("PGC_{}", flag.to_uppercase().replace('-', "_"))
}

/// Resolves a single optional string-valued setting with the full precedence
/// chain: explicit CLI value (already `Some` if the user passed it) > env var
/// (`PGC_<FLAG>` by default, or an explicit override name) > config file >
/// default.
pub fn resolve_opt(
    cli_value: Option<String>,
    flag: &str,
    env_override: Option<&str>,
    file: Option<&ConfigFile>,
    default: Option<&str>,
) -> Option<String> {
    if cli_value.is_some() {
        return cli_value;
    }
    if let Some(name) = env_override {
        if let Some(v) = env_opt(name) {
            return Some(v);
        }
    }
    if let Some(v) = env_opt(&pgc_env_name(flag)) {
        return Some(v);
    }
    if let Some(f) = file {
        if let Some(v) = f.get_str(flag) {
            return Some(v);
        }
    }
    default.map(|s| s.to_string())
}

/// Same precedence chain as [`resolve_opt`], parsed to `T`, falling back to
/// `default` when every layer is absent or fails to parse.
pub fn resolve_parsed<T>(
    cli_value: Option<T>,
    flag: &str,
    env_override: Option<&str>,
    file: Option<&ConfigFile>,
    default: T,
) -> T
where
    T: FromStr + Clone,
{
    if let Some(v) = cli_value {
        return v;
    }
    if let Some(name) = env_override {
        if let Some(v) = env_opt(name).and_then(|s| s.parse().ok()) {
            return v;
        }
    }
    if let Some(v) = env_opt(&pgc_env_name(flag)).and_then(|s| s.parse().ok()) {
        return v;
    }
    if let Some(f) = file {
        if let Some(v) = f.get_str(flag).and_then(|s| s.parse().ok()) {
            return v;
        }
    }
    default
}

/// Same precedence chain as [`resolve_opt`], but for a flag with no sensible
/// built-in default: errors if every layer (CLI, env, file) is absent.
pub fn resolve_required(
    cli_value: Option<String>,
    flag: &str,
    file: Option<&ConfigFile>,
) -> Result<String, ConfigError> {
    resolve_opt(cli_value, flag, None, file, None)
        .ok_or_else(|| ConfigError::MissingArgument(flag.to_string()))
}

/// Same as [`resolve_required`], parsed to `T`: errors if every layer is
/// absent, or if the resolved string fails to parse.
pub fn resolve_required_parsed<T: FromStr>(
    cli_value: Option<T>,
    flag: &str,
    file: Option<&ConfigFile>,
) -> Result<T, ConfigError> {
    if let Some(v) = cli_value {
        return Ok(v);
    }
    let raw = resolve_opt(None, flag, None, file, None)
        .ok_or_else(|| ConfigError::MissingArgument(flag.to_string()))?;
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        reason: format!("cannot parse {raw:?}"),
    })
}

/// `--spread` is repeatable on the CLI, but the env var / config file carry
/// its fallback as a single comma-joined string; only consulted when the CLI
/// gave no occurrences at all.
pub fn resolve_spread(cli_value: Vec<String>, file: Option<&ConfigFile>) -> Vec<String> {
    if !cli_value.is_empty() {
        return cli_value;
    }
    match resolve_opt(None, "spread", None, file, None) {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => Vec::new(),
    }
}

/// Optional env var, `None` if unset or blank.
pub fn env_opt(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// `schema.table` split, defaulting the schema to [`DEFAULT_SCHEMA`] when the
/// input carries no `.` separator. Errors if either resulting part is empty.
pub fn split_schema_table(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once('.') {
        Some((schema, table)) => {
            if schema.is_empty() || table.is_empty() {
                return Err(ConfigError::EmptyTableName {
                    raw: raw.to_string(),
                });
            }
            Ok((schema.to_string(), table.to_string()))
        }
        None => {
            if raw.is_empty() {
                return Err(ConfigError::EmptyTableName {
                    raw: raw.to_string(),
                });
            }
            Ok((DEFAULT_SCHEMA.to_string(), raw.to_string()))
        }
    }
}

/// PostgreSQL connection settings, read from `PGHOST`/`PGPORT`/`PGDATABASE`/
/// `PGUSER`/`PGPASSWORD` with the defaults `libpq` itself uses.
#[derive(Debug, Clone)]
pub struct PgConnectParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
}

impl PgConnectParams {
    pub fn from_env() -> Self {
        Self {
            host: env_opt("PGHOST").unwrap_or_else(|| "localhost".to_string()),
            port: env_opt("PGPORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(5432),
            database: env_opt("PGDATABASE").unwrap_or_else(|| "postgres".to_string()),
            user: env_opt("PGUSER").unwrap_or_else(|| "postgres".to_string()),
            password: env_opt("PGPASSWORD"),
        }
    }

    pub fn to_conn_string(&self) -> String {
        let mut s = format!(
            "host={} port={} dbname={} user={}",
            self.host, self.port, self.database, self.user
        );
        if let Some(pw) = &self.password {
            s.push_str(&format!(" password={pw}"));
        }
        s
    }
}

/// DB2 connection settings, read from `DB2_HOST/PORT/DATABASE/USER/PASSWORD/PROTOCOL`.
#[derive(Debug, Clone)]
pub struct Db2ConnectParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    pub protocol: String,
}

impl Db2ConnectParams {
    pub fn from_env() -> Self {
        Self {
            host: env_opt("DB2_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: env_opt("DB2_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(50000),
            database: env_opt("DB2_DATABASE").unwrap_or_else(|| "testdb".to_string()),
            user: env_opt("DB2_USER").unwrap_or_else(|| "db2inst1".to_string()),
            password: env_opt("DB2_PASSWORD"),
            protocol: env_opt("DB2_PROTOCOL").unwrap_or_else(|| "TCPIP".to_string()),
        }
    }

    /// Builds an ODBC connection string for `odbc-api`.
    pub fn to_odbc_conn_string(&self) -> String {
        let mut s = format!(
            "DRIVER={{IBM DB2 ODBC DRIVER}};DATABASE={};HOSTNAME={};PORT={};PROTOCOL={}",
            self.database, self.host, self.port, self.protocol
        );
        s.push_str(&format!(";UID={}", self.user));
        if let Some(pw) = &self.password {
            s.push_str(&format!(";PWD={pw}"));
        }
        s
    }
}

/// Best-effort `.env` load, matching the teacher's universal opening move in
/// every `main()`. No `.env` contract is required for this crate's
/// correctness; this is purely convenience for local development.
pub fn load_dotenv() {
    let _ = dotenv::dotenv();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_schema_and_table() {
        assert_eq!(
            split_schema_table("myschema.mytable").unwrap(),
            ("myschema".to_string(), "mytable".to_string())
        );
    }

    #[test]
    fn defaults_schema_when_absent() {
        assert_eq!(
            split_schema_table("mytable").unwrap(),
            (DEFAULT_SCHEMA.to_string(), "mytable".to_string())
        );
    }

    #[test]
    fn rejects_empty_table_name() {
        assert!(split_schema_table("").is_err());
        assert!(split_schema_table("schema.").is_err());
    }

    #[test]
    fn pgc_env_name_upper_snake_cases_the_flag() {
        assert_eq!(pgc_env_name("warmup-time"), "PGC_WARMUP_TIME");
    }
}
