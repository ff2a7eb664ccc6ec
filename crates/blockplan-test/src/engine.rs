//! MILP engine double.

use std::sync::Mutex;
use std::time::Duration;

use blockplan_solver::{
    LinearProgram, MilpEngine, SolveBudget, SolveOutcome, SolveStatus, SolverError,
};

#[derive(Debug, Clone, Copy)]
enum Script {
    Status(SolveStatus),
    Timeout,
}

/// Engine that never solves: it reports a scripted status or a timeout and
/// keeps the programs it was given.
#[derive(Debug)]
pub struct ScriptedEngine {
    script: Script,
    programs: Mutex<Vec<LinearProgram>>,
}

impl ScriptedEngine {
    pub fn status(status: SolveStatus) -> Self {
        Self {
            script: Script::Status(status),
            programs: Mutex::new(Vec::new()),
        }
    }

    pub fn timeout() -> Self {
        Self {
            script: Script::Timeout,
            programs: Mutex::new(Vec::new()),
        }
    }

    pub fn programs(&self) -> Vec<LinearProgram> {
        self.programs
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl MilpEngine for ScriptedEngine {
    fn solve(
        &self,
        program: LinearProgram,
        budget: &SolveBudget,
    ) -> Result<SolveOutcome, SolverError> {
        if let Ok(mut programs) = self.programs.lock() {
            programs.push(program);
        }
        match self.script {
            Script::Status(status) => Ok(SolveOutcome::without_solution(
                status,
                Duration::from_millis(1),
            )),
            Script::Timeout => Err(SolverError::TimedOut {
                limit: budget.time_limit,
            }),
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
