// crosscheck-core/src/domain/quality/verdict.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed three-way verdict of a validation cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Ok,
    Violation,
    Unavailable { reason: UnavailableReason },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The CDE has no column in this system; no query was issued.
    ColumnNotMapped,
    /// Connection or query failure for this cell.
    FetchFailed { error: String },
    /// The run deadline elapsed before the cell was evaluated.
    TimedOut,
    /// No cell was recorded for this position of the grid.
    NotEvaluated,
}

impl Verdict {
    pub fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Violation)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Cell text used by table and CSV projections.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Violation => "VIOLATION",
            Self::Unavailable { .. } => "-",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotMapped => f.write_str("column not mapped"),
            Self::FetchFailed { error } => write!(f, "fetch failed: {}", error),
            Self::TimedOut => f.write_str("timed out"),
            Self::NotEvaluated => f.write_str("not evaluated"),
        }
    }
}
