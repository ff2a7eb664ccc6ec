//! blockplan Optimizer - Facility and population allocation for converting blocks
//!
//! This crate provides the allocation pipeline:
//! - Demand/capacity estimation over accessibility catchments
//! - Brick catalog enumeration per block
//! - Construction of one mixed-integer program for all converting blocks
//! - Decoding of the solution into capacity and population deltas
//! - Demolition deltas for converting blocks
//! - Before/after provision scoring, with a greedy reference engine
//!
//! Logging levels:
//! - **INFO**: Calculation start/end, provision results
//! - **DEBUG**: Per-block estimates and program size
//! - **WARN**: Missing brick catalogs, skipped blocks, non-optimal solves

pub mod catalog;
pub mod context;
pub mod decoder;
pub mod demolition;
pub mod estimator;
pub mod model;
pub mod optimizer;
pub mod provision;
pub mod result;

pub use catalog::{BlockCatalog, BrickRow, CalculationWarning};
pub use context::{BlockPlan, CalculationContext, SkippedBlock};
pub use decoder::{decode, BuiltBrick, DecodedAllocation};
pub use demolition::{demolition_row, demolition_table};
pub use estimator::{estimate, population_ceiling, CatchmentCache, EstimationConstants, ServiceBalance};
pub use model::{category_weights, AllocationModel, BlockVariables, ModelBuilder};
pub use optimizer::BlockOptimizer;
pub use provision::{evaluate_provision_impact, GreedyProvision, ProvisionImpact};
pub use result::{BlockReport, CalculationResult};
