//! Isolation level mapping (§3). DB2 and Postgres tag sets differ; the
//! caller-facing integer `0..3` maps per backend — see the DB2 tag-order
//! note in DESIGN.md (spec.md's literal UR/CS/RS/RR order wins over the
//! original Go source's UR/RS/CS/RR enum order).

/// Backend-agnostic isolation level selector, as passed on the CLI
/// (`--isolationLevel N`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationLevel(pub u8);

/// DB2 isolation tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Db2Isolation {
    UncommittedRead,
    CursorStability,
    ReadStability,
    RepeatableRead,
}

impl Db2Isolation {
    /// Per spec.md §3: 0=UR, 1=CS, 2=RS, 3=RR; anything >= 3 clamps to RR.
    pub fn from_level(level: IsolationLevel) -> Self {
        match level.0 {
            0 => Db2Isolation::UncommittedRead,
            1 => Db2Isolation::CursorStability,
            2 => Db2Isolation::ReadStability,
            _ => Db2Isolation::RepeatableRead,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Db2Isolation::UncommittedRead => "UR",
            Db2Isolation::CursorStability => "CS",
            Db2Isolation::ReadStability => "RS",
            Db2Isolation::RepeatableRead => "RR",
        }
    }

    /// `SET CURRENT ISOLATION <tag>` — the DB2 session-isolation statement.
    pub fn set_statement(&self) -> String {
        format!("SET CURRENT ISOLATION {}", self.tag())
    }
}

/// PostgreSQL isolation tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgIsolation {
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl PgIsolation {
    /// Per spec.md §3: 0 and 1 collapse to READ COMMITTED, 2 to REPEATABLE
    /// READ, anything >= 3 to SERIALIZABLE.
    pub fn from_level(level: IsolationLevel) -> Self {
        match level.0 {
            0 | 1 => PgIsolation::ReadCommitted,
            2 => PgIsolation::RepeatableRead,
            _ => PgIsolation::Serializable,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            PgIsolation::ReadCommitted => "READ COMMITTED",
            PgIsolation::RepeatableRead => "REPEATABLE READ",
            PgIsolation::Serializable => "SERIALIZABLE",
        }
    }

    /// `SET TRANSACTION ISOLATION LEVEL <tag>` — applied at the start of a
    /// Postgres transaction.
    pub fn set_statement(&self) -> String {
        format!("SET TRANSACTION ISOLATION LEVEL {}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db2_distinguishes_ur_and_cs() {
        assert_eq!(Db2Isolation::from_level(IsolationLevel(0)).tag(), "UR");
        assert_eq!(Db2Isolation::from_level(IsolationLevel(1)).tag(), "CS");
        assert_eq!(Db2Isolation::from_level(IsolationLevel(2)).tag(), "RS");
        assert_eq!(Db2Isolation::from_level(IsolationLevel(3)).tag(), "RR");
        assert_eq!(Db2Isolation::from_level(IsolationLevel(9)).tag(), "RR");
    }

    #[test]
    fn pg_collapses_0_and_1_to_read_committed() {
        assert_eq!(
            PgIsolation::from_level(IsolationLevel(0)).tag(),
            "READ COMMITTED"
        );
        assert_eq!(
            PgIsolation::from_level(IsolationLevel(1)).tag(),
            "READ COMMITTED"
        );
        assert_eq!(
            PgIsolation::from_level(IsolationLevel(2)).tag(),
            "REPEATABLE READ"
        );
        assert_eq!(
            PgIsolation::from_level(IsolationLevel(5)).tag(),
            "SERIALIZABLE"
        );
    }
}
