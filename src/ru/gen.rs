//! RU Generation Driver (§4.9): deterministic synthetic OLTP rows skewed
//! toward 50 hot accounts, grounded on
//! `original_source/pkg/ruperformance/gen.go`'s hash/pool/batch shape.

use chrono::NaiveDateTime;
use sha2::{Digest, Sha256};

use crate::backend::Client;
use crate::errors::IngestError;
use crate::payload::remap_keystream_to_text;
use crate::sql::SqlDialect;

/// Fixed generator seed (`S` in §4.9's hash formula).
const SEED: u64 = 0xC0FFEE12345;
const BATCH_ROWS: u64 = 100;

fn hash_u64(seed: u64, r: u64, salt: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_be_bytes());
    hasher.update(r.to_be_bytes());
    hasher.update(salt.to_be_bytes());
    let digest = hasher.finalize();
    u64::from_be_bytes(digest[0..8].try_into().expect("sha256 digest is >= 8 bytes"))
}

/// 60% of rows land on one of 50 hot accounts `[1, 50]`; the rest scatter
/// across `[51, 10000]`.
pub(crate) fn pick_account_id(seed: u64, r: u64) -> i64 {
    if hash_u64(seed, r, 0) % 100 < 60 {
        1 + (hash_u64(seed, r, 1) % 50) as i64
    } else {
        51 + (hash_u64(seed, r, 2) % 9950) as i64
    }
}

/// Cents in `[-5000.00, 5000.00]`, snapped to exactly `0` below a half-cent
/// to avoid printing `-0.00`.
fn pick_amount(seed: u64, r: u64) -> f64 {
    let raw = (hash_u64(seed, r, 3) % 1_000_001) as i64 - 500_000;
    let amount = raw as f64 / 100.0;
    if amount.abs() < 0.005 {
        0.0
    } else {
        amount
    }
}

/// 100 ASCII characters through the same keystream-XOR-then-alphabet-remap
/// step as [`crate::payload::generate_text_payload`], keyed off `hash(S, r,
/// salt)` for `salt = 0, 1, 2, …` instead of a plain counter.
fn generate_description(seed: u64, r: u64) -> String {
    const LEN: usize = 100;
    let mut keystream = Vec::with_capacity(LEN + 8);
    let mut salt = 0u64;
    while keystream.len() < LEN {
        keystream.extend_from_slice(&hash_u64(seed, r, salt).to_be_bytes());
        salt += 1;
    }
    keystream.truncate(LEN);
    remap_keystream_to_text(&keystream)
}

fn sql_string_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn row_literal(dialect: &dyn SqlDialect, seed: u64, r: u64, base: NaiveDateTime) -> String {
    let acct_id = pick_account_id(seed, r);
    let ts = base + chrono::Duration::milliseconds(r as i64);
    let ts_literal = dialect.ru_timestamp_literal(ts);
    let amount = pick_amount(seed, r);
    let descr = sql_string_literal(&generate_description(seed, r));
    format!("({acct_id}, {ts_literal}, {amount:.2}, {descr})")
}

fn process_start_second() -> NaiveDateTime {
    let now_secs = chrono::Utc::now().timestamp();
    chrono::DateTime::from_timestamp(now_secs, 0)
        .expect("current unix timestamp is always representable")
        .naive_utc()
}

pub async fn run(
    client: &dyn Client,
    dialect: &dyn SqlDialect,
    schema: &str,
    table: &str,
    num_rows: u64,
) -> anyhow::Result<()> {
    let pool = client.pool().await?;
    let mut conn = pool.connect().await?;

    let base = process_start_second();
    tracing::info!(num_rows, base = %base, "generating RU rows");

    let mut next_row: u64 = 0;
    let mut batch_index: usize = 0;
    while next_row < num_rows {
        let batch_end = (next_row + BATCH_ROWS).min(num_rows);
        let rows_sql: Vec<String> = (next_row..batch_end)
            .map(|r| row_literal(dialect, SEED, r, base))
            .collect();
        let sql = format!(
            "{}{};",
            dialect.ru_insert_sql_prefix(schema, table),
            rows_sql.join(", ")
        );

        conn.begin().await.map_err(|e| IngestError::BatchFailed {
            batch_index,
            source: format!("begin failed: {e}"),
        })?;
        match conn.execute(&sql).await {
            Ok(_) => {
                conn.commit().await.map_err(|e| IngestError::BatchFailed {
                    batch_index,
                    source: format!("commit failed: {e}"),
                })?;
            }
            Err(e) => {
                let _ = conn.rollback().await;
                return Err(IngestError::BatchFailed {
                    batch_index,
                    source: e.to_string(),
                }
                .into());
            }
        }

        tracing::info!(
            batch_index,
            from = next_row,
            to = batch_end - 1,
            total = num_rows,
            "inserted RU batch"
        );
        next_row = batch_end;
        batch_index += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::postgres::PgDialect;

    #[test]
    fn hot_accounts_stay_in_one_to_fifty() {
        for r in 0..500u64 {
            if hash_u64(SEED, r, 0) % 100 < 60 {
                let acct = pick_account_id(SEED, r);
                assert!((1..=50).contains(&acct));
            }
        }
    }

    #[test]
    fn cold_accounts_stay_in_fifty_one_to_ten_thousand() {
        for r in 0..500u64 {
            if hash_u64(SEED, r, 0) % 100 >= 60 {
                let acct = pick_account_id(SEED, r);
                assert!((51..=10_000).contains(&acct));
            }
        }
    }

    #[test]
    fn amount_never_prints_negative_zero() {
        for r in 0..2000u64 {
            let amt = pick_amount(SEED, r);
            let formatted = format!("{amt:.2}");
            assert_ne!(formatted, "-0.00");
        }
    }

    #[test]
    fn description_is_exactly_one_hundred_alphabet_chars() {
        let descr = generate_description(SEED, 7);
        assert_eq!(descr.len(), 100);
        assert!(descr
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_'));
    }

    #[test]
    fn generation_is_deterministic_given_the_same_seed_and_row() {
        assert_eq!(pick_account_id(SEED, 42), pick_account_id(SEED, 42));
        assert_eq!(pick_amount(SEED, 42), pick_amount(SEED, 42));
        assert_eq!(generate_description(SEED, 42), generate_description(SEED, 42));
    }

    #[test]
    fn row_literal_embeds_a_quoted_description() {
        let dialect = PgDialect;
        let base = NaiveDateTime::parse_from_str("2026-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let literal = row_literal(&dialect, SEED, 1, base);
        assert!(literal.starts_with('('));
        assert!(literal.ends_with(')'));
    }
}
