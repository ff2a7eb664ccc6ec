//! blockplan Solver - Mixed-integer programs and the engines that solve them
//!
//! This crate provides:
//! - A solver-independent linear program model (variables, expressions,
//!   constraints, objective)
//! - The `MilpEngine` seam used by the allocation optimizer
//! - A pure-Rust engine backed by `good_lp` and `microlp`
//!
//! Logging levels:
//! - **INFO**: Solve end with status and duration
//! - **DEBUG**: Solve start with problem scale

pub mod engine;
pub mod error;
pub mod microlp;
pub mod program;

pub use blockplan_core::SolveStatus;
pub use engine::{MilpEngine, SolveBudget, SolveOutcome};
pub use error::SolverError;
pub use microlp::MicroLpEngine;
pub use program::{Constraint, LinearExpr, LinearProgram, Sense, VarId, VariableDef};
