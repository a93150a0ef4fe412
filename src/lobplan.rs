//! LOB Plan Builder (§4.4): a deterministic list of rows to insert given a
//! byte budget, per-bucket sizes, and an empty-LOB count.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::PlanError;
use crate::sizeparse::Bucket;

/// The kind of LOB a row plan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    Blob,
    Clob,
}

impl LobKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "blob" | "bytea" => Some(LobKind::Blob),
            "clob" | "text" => Some(LobKind::Clob),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LobKind::Blob => "blob",
            LobKind::Clob => "clob",
        }
    }
}

/// One row to be inserted by the ingestion driver (§3 "LOB row plan").
/// `tenant_id`/`doc_type` carry no cross-row variation in the source this was
/// distilled from; every row targets tenant 1 tagged with its own LOB kind,
/// which is enough to exercise the "exactly one payload column set" table
/// invariant without inventing an unspecified multi-tenant distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct LobRowPlan {
    pub row_index: u64,
    pub tenant_id: i32,
    pub lob_kind: LobKind,
    pub lob_bytes: i64,
    pub doc_type: String,
}

const PERCENT_TOLERANCE: f64 = 1e-4;

/// Builds the ordered list of [`LobRowPlan`] per §4.4's algorithm.
pub fn build_lob_plan(
    total_bytes: i64,
    lob_kind: LobKind,
    buckets: &[Bucket],
    empty_lobs: i64,
) -> Result<Vec<LobRowPlan>, PlanError> {
    if total_bytes < 0 {
        return Err(PlanError::NegativeTotal { total: total_bytes });
    }
    if empty_lobs < 0 {
        return Err(PlanError::NegativeEmptyCount { count: empty_lobs });
    }

    if buckets.is_empty() {
        if total_bytes == 0 {
            let plan = (0..empty_lobs as u64)
                .map(|i| LobRowPlan {
                    row_index: i,
                    tenant_id: 1,
                    lob_kind,
                    lob_bytes: 0,
                    doc_type: lob_kind.as_str().to_string(),
                })
                .collect();
            return Ok(plan);
        }
        return Err(PlanError::NoSpreadNonZeroTotal);
    }

    let mut sum_pct = 0.0f64;
    for b in buckets {
        if b.size <= 0 {
            return Err(PlanError::NonPositiveBucketSize { size: b.size });
        }
        sum_pct += b.percent;
    }
    if (sum_pct - 100.0).abs() > PERCENT_TOLERANCE {
        return Err(PlanError::PercentageMismatch { sum: sum_pct });
    }

    struct Alloc {
        size: i64,
        rows: i64,
        used_bytes: i64,
    }

    let mut allocs: Vec<Alloc> = Vec::with_capacity(buckets.len());
    let mut assigned: i64 = 0;
    let last_idx = buckets.len() - 1;
    for (i, b) in buckets.iter().enumerate() {
        let target = if i == last_idx {
            total_bytes - assigned
        } else {
            ((b.percent / 100.0) * total_bytes as f64).round() as i64
        };
        assigned += target;

        let rows = target / b.size;
        let used_bytes = rows * b.size;
        allocs.push(Alloc {
            size: b.size,
            rows,
            used_bytes,
        });
    }

    let used_total: i64 = allocs.iter().map(|a| a.used_bytes).sum();
    let mut left = total_bytes - used_total;

    allocs.sort_by_key(|a| a.size);

    while left > 0 {
        let mut added = false;
        for a in allocs.iter_mut() {
            if a.size <= left {
                a.rows += 1;
                a.used_bytes += a.size;
                left -= a.size;
                added = true;
                if left == 0 {
                    break;
                }
            }
        }
        if !added {
            tracing::debug!(leftover_bytes = left, "dropping leftover bytes smaller than any bucket");
            break;
        }
    }

    let mut plan = Vec::new();
    let mut idx: u64 = 0;
    for a in &allocs {
        for _ in 0..a.rows {
            plan.push(LobRowPlan {
                row_index: idx,
                tenant_id: 1,
                lob_kind,
                lob_bytes: a.size,
                doc_type: lob_kind.as_str().to_string(),
            });
            idx += 1;
        }
    }
    for _ in 0..empty_lobs {
        plan.push(LobRowPlan {
            row_index: idx,
            tenant_id: 1,
            lob_kind,
            lob_bytes: 0,
            doc_type: lob_kind.as_str().to_string(),
        });
        idx += 1;
    }

    Ok(plan)
}

/// Fisher-Yates shuffle of `[0..n)`. `seed == 0` means time-based (a fresh,
/// non-reproducible shuffle each call); any other seed is reproducible.
pub fn shuffled_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng: StdRng = if seed == 0 {
        StdRng::from_entropy()
    } else {
        StdRng::seed_from_u64(seed)
    };
    for i in (1..n).rev() {
        let j = rng.gen_range(0..=i);
        idx.swap(i, j);
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizeparse::parse_spread;

    #[test]
    fn scenario_3_two_buckets_plus_empties() {
        let bucket = parse_spread("50%:512b").unwrap();
        let plan = build_lob_plan(1024, LobKind::Blob, &[bucket], 2).unwrap();
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[0].lob_bytes, 512);
        assert_eq!(plan[1].lob_bytes, 512);
        assert_eq!(plan[2].lob_bytes, 0);
        assert_eq!(plan[3].lob_bytes, 0);
    }

    #[test]
    fn scenario_4_leftover_dropped() {
        let b1 = parse_spread("50%:256b").unwrap();
        let b2 = parse_spread("50%:256b").unwrap();
        let plan = build_lob_plan(1000, LobKind::Clob, &[b1, b2], 0).unwrap();
        assert_eq!(plan.len(), 3);
        for row in &plan {
            assert_eq!(row.lob_bytes, 256);
        }
    }

    #[test]
    fn no_buckets_zero_total_emits_only_empties() {
        let plan = build_lob_plan(0, LobKind::Blob, &[], 5).unwrap();
        assert_eq!(plan.len(), 5);
        assert!(plan.iter().all(|r| r.lob_bytes == 0));
    }

    #[test]
    fn no_buckets_nonzero_total_fails() {
        assert!(build_lob_plan(100, LobKind::Blob, &[], 0).is_err());
    }

    #[test]
    fn percentage_mismatch_fails() {
        let b = parse_spread("50%:256b").unwrap();
        assert!(build_lob_plan(1000, LobKind::Blob, &[b], 0).is_err());
    }

    #[test]
    fn shuffle_is_a_permutation_and_reproducible() {
        let a = shuffled_indices(20, 42);
        let b = shuffled_indices(20, 42);
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn row_count_is_dense_starting_at_zero() {
        let bucket = parse_spread("100%:100b").unwrap();
        let plan = build_lob_plan(1000, LobKind::Blob, &[bucket], 0).unwrap();
        for (i, row) in plan.iter().enumerate() {
            assert_eq!(row.row_index, i as u64);
        }
    }
}
