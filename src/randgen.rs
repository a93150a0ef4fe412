//! Random ID Generator (§4.6): reproducible sequential-shuffle or scattered
//! id streams, plus a thread-safe wrapper. Grounded on
//! `original_source/pkg/lobperformance/rand_generator.go`.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draw mode for [`RandGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandMode {
    /// Each value in `[min, max]` exactly once per cycle, then wraps.
    Sequential,
    /// Uniform independent draws from `[min, max]`.
    Scattered,
}

impl RandMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "sequential" => Some(RandMode::Sequential),
            "scattered" => Some(RandMode::Scattered),
            _ => None,
        }
    }
}

/// Reproducible id generator over an inclusive `[min, max]` range.
pub struct RandGenerator {
    min: i64,
    max: i64,
    mode: RandMode,
    rng: StdRng,
    seq: Vec<i64>,
    index: usize,
}

impl RandGenerator {
    /// `seed == 0` means time-based (non-reproducible). Requires `min <= max`.
    pub fn new(min: i64, max: i64, mode: RandMode, seed: i64) -> Result<Self, String> {
        if min > max {
            return Err(format!("min ({min}) must be <= max ({max})"));
        }
        let mut rng: StdRng = if seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(seed as u64)
        };

        let seq = if matches!(mode, RandMode::Sequential) {
            let mut s: Vec<i64> = (min..=max).collect();
            for i in (1..s.len()).rev() {
                let j = rng.gen_range(0..=i);
                s.swap(i, j);
            }
            s
        } else {
            Vec::new()
        };

        Ok(Self {
            min,
            max,
            mode,
            rng,
            seq,
            index: 0,
        })
    }

    /// Draws the next id per the configured mode.
    pub fn next(&mut self) -> i64 {
        match self.mode {
            RandMode::Sequential => {
                let v = self.seq[self.index];
                self.index = (self.index + 1) % self.seq.len();
                v
            }
            RandMode::Scattered => self.rng.gen_range(self.min..=self.max),
        }
    }
}

/// Thread-safe wrapper: concurrent readers call `next()` through this, never
/// the underlying [`RandGenerator`] directly, serializing with a mutex. No
/// `.await` is ever held while the lock is taken.
pub struct SafeRandGenerator {
    inner: Mutex<RandGenerator>,
}

impl SafeRandGenerator {
    pub fn new(gen: RandGenerator) -> Self {
        Self {
            inner: Mutex::new(gen),
        }
    }

    pub fn next(&self) -> i64 {
        let mut guard = self.inner.lock().expect("rand generator mutex poisoned");
        guard.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_min_greater_than_max() {
        assert!(RandGenerator::new(10, 5, RandMode::Scattered, 1).is_err());
    }

    #[test]
    fn parses_read_mode_case_insensitively() {
        assert_eq!(RandMode::parse("Scattered"), Some(RandMode::Scattered));
        assert_eq!(RandMode::parse("sequential"), Some(RandMode::Sequential));
        assert_eq!(RandMode::parse("bogus"), None);
    }

    #[test]
    fn sequential_covers_every_value_exactly_once_per_cycle() {
        let mut gen = RandGenerator::new(1, 10, RandMode::Sequential, 42).unwrap();
        let mut seen: Vec<i64> = (0..10).map(|_| gen.next()).collect();
        seen.sort();
        assert_eq!(seen, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn sequential_wraps() {
        let mut gen = RandGenerator::new(1, 3, RandMode::Sequential, 7).unwrap();
        let first_cycle: Vec<i64> = (0..3).map(|_| gen.next()).collect();
        let second_cycle: Vec<i64> = (0..3).map(|_| gen.next()).collect();
        let mut first_sorted = first_cycle.clone();
        first_sorted.sort();
        assert_eq!(first_sorted, vec![1, 2, 3]);
        assert_eq!(first_cycle, second_cycle);
    }

    #[test]
    fn scattered_stays_in_range() {
        let mut gen = RandGenerator::new(5, 8, RandMode::Scattered, 99).unwrap();
        for _ in 0..50 {
            let v = gen.next();
            assert!((5..=8).contains(&v));
        }
    }

    #[test]
    fn safe_wrapper_serializes_access() {
        let gen = RandGenerator::new(1, 5, RandMode::Scattered, 1).unwrap();
        let safe = SafeRandGenerator::new(gen);
        for _ in 0..10 {
            let v = safe.next();
            assert!((1..=5).contains(&v));
        }
    }
}
