//! Pure-Rust engine backed by `good_lp` with the `microlp` solver.
//!
//! The backend has no time limit of its own, so each solve runs on a worker
//! thread and the caller stops waiting once the budget elapses. The worker is
//! detached in that case and keeps a core busy until microlp returns, which
//! may be never. [`MicroLpEngine::live_workers`] counts workers still running.
//!
//! microlp does not report unboundedness for integer variables; it clamps them
//! at `i32::MAX` and returns a solution. A variable without an upper bound that
//! reaches [`UNBOUNDED_VALUE`] is read as an unbounded program.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use blockplan_core::SolveStatus;
use good_lp::{
    constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel,
    Variable,
};
use tracing::{debug, info, warn};

use crate::engine::{MilpEngine, SolveBudget, SolveOutcome};
use crate::error::SolverError;
use crate::program::{LinearExpr, LinearProgram, Sense};

/// Values at or above this on a variable with no upper bound mean the backend
/// hit its integer clamp.
pub const UNBOUNDED_VALUE: f64 = 1.0e9;

/// Branch-and-bound engine from the `microlp` crate.
#[derive(Debug, Clone, Default)]
pub struct MicroLpEngine {
    live_workers: Arc<AtomicUsize>,
}

impl MicroLpEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Solve workers started by this engine (or its clones) that have not
    /// returned yet, including ones abandoned after a timeout.
    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::SeqCst)
    }
}

/// Decrements the live worker count when the worker thread exits.
struct WorkerGuard(Arc<AtomicUsize>);

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MilpEngine for MicroLpEngine {
    fn solve(
        &self,
        program: LinearProgram,
        budget: &SolveBudget,
    ) -> Result<SolveOutcome, SolverError> {
        debug!(
            event = "solve_start",
            engine = self.name(),
            program = program.name(),
            variable_count = program.variable_count(),
            constraint_count = program.constraint_count(),
            time_limit_ms = budget.time_limit.as_millis() as u64,
        );

        let start = Instant::now();
        let (sender, receiver) = mpsc::channel();
        self.live_workers.fetch_add(1, Ordering::SeqCst);
        let guard = WorkerGuard(Arc::clone(&self.live_workers));
        let handle = thread::Builder::new()
            .name("blockplan-milp".to_string())
            .spawn(move || {
                let _guard = guard;
                let _ = sender.send(solve_blocking(&program));
            })
            .map_err(|e| SolverError::Backend(e.to_string()))?;

        match receiver.recv_timeout(budget.time_limit) {
            Ok((status, values, objective)) => {
                let _ = handle.join();
                let duration = start.elapsed();
                info!(
                    event = "solve_end",
                    engine = self.name(),
                    status = %status,
                    duration_ms = duration.as_millis() as u64,
                );
                Ok(SolveOutcome {
                    status,
                    values,
                    objective,
                    duration,
                })
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    event = "solve_timeout",
                    engine = self.name(),
                    time_limit_ms = budget.time_limit.as_millis() as u64,
                    live_workers = self.live_workers() as u64,
                );
                Err(SolverError::TimedOut {
                    limit: budget.time_limit,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(SolverError::WorkerLost),
        }
    }

    fn name(&self) -> &'static str {
        "microlp"
    }
}

fn solve_blocking(program: &LinearProgram) -> (SolveStatus, Vec<f64>, Option<f64>) {
    let mut vars = ProblemVariables::new();
    let handles: Vec<Variable> = program
        .variables()
        .iter()
        .map(|def| {
            let mut definition = variable().min(def.lower).name(def.name.clone());
            if let Some(upper) = def.upper {
                definition = definition.max(upper);
            }
            if def.integer {
                definition = definition.integer();
            }
            vars.add(definition)
        })
        .collect();

    let objective = to_expression(program.objective(), &handles);
    let mut model = vars.maximise(objective).using(good_lp::microlp);
    for c in program.constraints() {
        // Rows without variables are decided here; a false one makes the
        // whole program infeasible.
        if c.expr.is_constant() {
            if !c.is_satisfied(&[], 1e-9) {
                debug!(event = "constant_row_violated", constraint = %c.name);
                return (SolveStatus::Infeasible, Vec::new(), None);
            }
            continue;
        }
        let lhs = to_expression(&c.expr, &handles);
        let rhs = c.rhs;
        let constraint = match c.sense {
            Sense::Le => constraint!(lhs <= rhs),
            Sense::Ge => constraint!(lhs >= rhs),
        };
        model.add_constraint(constraint);
    }

    match model.solve() {
        Ok(solution) => {
            let values: Vec<f64> = handles.iter().map(|v| solution.value(*v)).collect();
            if let Some(def) = clamped_variable(program, &values) {
                debug!(event = "unbounded_variable", variable = %def);
                return (SolveStatus::Unbounded, Vec::new(), None);
            }
            let objective = program.objective().eval(&values);
            (SolveStatus::Optimal, values, Some(objective))
        }
        Err(ResolutionError::Infeasible) => (SolveStatus::Infeasible, Vec::new(), None),
        Err(ResolutionError::Unbounded) => (SolveStatus::Unbounded, Vec::new(), None),
        Err(other) => {
            warn!(event = "solve_failed", reason = %other);
            (SolveStatus::NotSolved, Vec::new(), None)
        }
    }
}

fn clamped_variable<'p>(program: &'p LinearProgram, values: &[f64]) -> Option<&'p str> {
    program
        .variables()
        .iter()
        .zip(values)
        .find(|(def, value)| def.upper.is_none() && **value >= UNBOUNDED_VALUE)
        .map(|(def, _)| def.name.as_str())
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(handles.len());
    out += expr.constant();
    for (var, coef) in expr.terms() {
        out += coef * handles[var.index()];
    }
    out
}
