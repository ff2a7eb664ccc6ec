//! The engine seam between program construction and solving.

use std::time::Duration;

use blockplan_core::SolveStatus;

use crate::error::SolverError;
use crate::program::{LinearProgram, VarId};

/// Resources an engine may spend on one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveBudget {
    pub time_limit: Duration,
}

impl SolveBudget {
    pub fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }
}

/// Status and assignment reported by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Solved value per variable, indexed by [`VarId`]; empty unless optimal.
    pub values: Vec<f64>,
    /// Objective value of the assignment; `None` unless optimal.
    pub objective: Option<f64>,
    pub duration: Duration,
}

impl SolveOutcome {
    /// Outcome carrying no assignment.
    pub fn without_solution(status: SolveStatus, duration: Duration) -> Self {
        Self {
            status,
            values: Vec::new(),
            objective: None,
            duration,
        }
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.index()).copied()
    }
}

/// A mixed-integer engine.
///
/// `solve` blocks until the engine reports or the budget elapses. Exceeding
/// the budget is an error rather than a status so callers can tell it apart
/// from infeasibility.
pub trait MilpEngine: Send + Sync {
    fn solve(
        &self,
        program: LinearProgram,
        budget: &SolveBudget,
    ) -> Result<SolveOutcome, SolverError>;

    fn name(&self) -> &'static str;
}
