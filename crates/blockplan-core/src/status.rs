//! Terminal status of an allocation program solve.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome reported by a mixed-integer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// An optimal assignment was found.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective can grow without limit.
    Unbounded,
    /// The engine stopped without a conclusive answer.
    NotSolved,
}

impl SolveStatus {
    pub fn is_optimal(self) -> bool {
        self == SolveStatus::Optimal
    }

    /// Returns the status as a string.
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::NotSolved => "not solved",
        }
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
