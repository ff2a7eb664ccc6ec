//! Error types for solver engines

use std::time::Duration;

use blockplan_core::BlockPlanError;
use thiserror::Error;

/// Failures of an engine run that are not a solve status.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The engine did not report back within its budget.
    #[error("solver exceeded its time budget of {limit:?}")]
    TimedOut { limit: Duration },

    /// The solve worker stopped without reporting a result.
    #[error("solver worker terminated without a result")]
    WorkerLost,

    /// The backend could not be started or rejected the model.
    #[error("solver backend error: {0}")]
    Backend(String),
}

impl From<SolverError> for BlockPlanError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::TimedOut { limit } => BlockPlanError::SolverTimeout { limit },
            other => BlockPlanError::Solver(other.to_string()),
        }
    }
}
