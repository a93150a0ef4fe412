//! Size & Spread Parser (§4.3): byte-size suffix parsing and `percent:size`
//! bucket parsing. Hand-rolled rather than via a `regex` crate — the teacher's
//! dependency table has no `regex` entry anywhere, so this follows suit.

use crate::errors::ConfigError;

/// One bucket of the LOB size distribution: a percentage of the total byte
/// budget mapped to an exact per-row size.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub percent: f64,
    pub size: i64,
    pub raw: String,
}

const UNIT_TABLE: &[(&str, i64)] = &[
    ("tb", 1024 * 1024 * 1024 * 1024),
    ("t", 1024 * 1024 * 1024 * 1024),
    ("gb", 1024 * 1024 * 1024),
    ("g", 1024 * 1024 * 1024),
    ("mb", 1024 * 1024),
    ("m", 1024 * 1024),
    ("kb", 1024),
    ("k", 1024),
    ("b", 1),
];

/// Parses a case-insensitive byte-size literal: a non-negative decimal number
/// followed by an optional unit suffix from `{b, kb, k, mb, m, gb, g, tb, t}`
/// (base-1024). No suffix means bytes. Rounds half-away-from-zero and rejects
/// overflow past `i64::MAX`.
pub fn parse_byte_size(input: &str) -> Result<i64, ConfigError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidByteSize {
            raw: input.to_string(),
            reason: "empty input".to_string(),
        });
    }
    let lower = trimmed.to_ascii_lowercase();

    let (number_part, multiplier) = UNIT_TABLE
        .iter()
        .find_map(|(suffix, mult)| {
            lower
                .strip_suffix(suffix)
                .map(|num| (num.trim(), *mult))
        })
        .unwrap_or((lower.as_str(), 1));

    if number_part.is_empty() {
        return Err(ConfigError::InvalidByteSize {
            raw: input.to_string(),
            reason: "missing numeric part".to_string(),
        });
    }
    let value: f64 = number_part.parse().map_err(|_| ConfigError::InvalidByteSize {
        raw: input.to_string(),
        reason: format!("not a number: {number_part:?}"),
    })?;
    if value < 0.0 || !value.is_finite() {
        return Err(ConfigError::InvalidByteSize {
            raw: input.to_string(),
            reason: "negative or non-finite value".to_string(),
        });
    }

    let scaled = value * (multiplier as f64);
    if scaled > i64::MAX as f64 {
        return Err(ConfigError::InvalidByteSize {
            raw: input.to_string(),
            reason: "overflows i64".to_string(),
        });
    }
    // round half-away-from-zero; scaled is always >= 0 here.
    Ok((scaled + 0.5).floor() as i64)
}

/// Parses `<percent>%:<size>`, e.g. `"30%:64kb"`. Percent must be in `(0,100]`;
/// size must parse via [`parse_byte_size`] and be `> 0`.
pub fn parse_spread(input: &str) -> Result<Bucket, ConfigError> {
    let raw = input.to_string();
    let trimmed = input.trim();
    let percent_idx = trimmed.find('%').ok_or_else(|| ConfigError::InvalidSpread {
        raw: raw.clone(),
        reason: "missing '%'".to_string(),
    })?;
    let (percent_str, rest) = trimmed.split_at(percent_idx);
    let rest = &rest[1..]; // drop '%'
    let rest = rest.trim_start();
    let rest = rest.strip_prefix(':').ok_or_else(|| ConfigError::InvalidSpread {
        raw: raw.clone(),
        reason: "missing ':' separator".to_string(),
    })?;
    let size_str = rest.trim();

    let percent: f64 = percent_str
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidSpread {
            raw: raw.clone(),
            reason: format!("invalid percent {:?}", percent_str.trim()),
        })?;
    if !(percent > 0.0 && percent <= 100.0) {
        return Err(ConfigError::InvalidSpread {
            raw: raw.clone(),
            reason: format!("percent {percent} out of range (0,100]"),
        });
    }

    let size = parse_byte_size(size_str).map_err(|e| ConfigError::InvalidSpread {
        raw: raw.clone(),
        reason: format!("invalid size: {e}"),
    })?;
    if size <= 0 {
        return Err(ConfigError::InvalidSpread {
            raw: raw.clone(),
            reason: "size must be > 0".to_string(),
        });
    }

    Ok(Bucket {
        percent,
        size,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_bytes() {
        assert_eq!(parse_byte_size("0").unwrap(), 0);
    }

    #[test]
    fn parses_kb() {
        assert_eq!(parse_byte_size("2kb").unwrap(), 2048);
    }

    #[test]
    fn parses_fractional_mb() {
        assert_eq!(parse_byte_size("1.5mb").unwrap(), 1_572_864);
    }

    #[test]
    fn rejects_unknown_unit() {
        assert!(parse_byte_size("7qb").is_err());
    }

    #[test]
    fn parses_spread_bucket() {
        let b = parse_spread("30%:64kb").unwrap();
        assert_eq!(b.percent, 30.0);
        assert_eq!(b.size, 65536);
        assert_eq!(b.raw, "30%:64kb");
    }

    #[test]
    fn rejects_zero_percent_spread() {
        assert!(parse_spread("0%:1b").is_err());
    }
}
