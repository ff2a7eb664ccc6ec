//! blockplan - Facility allocation for land-use redevelopment
//!
//! Given blocks whose land use changes, blockplan decides which facilities to
//! build on each, how much population it may add, and how the change moves
//! city-wide service provision.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use blockplan::prelude::*;
//!
//! let city = InMemoryCity::new(
//!     vec![
//!         Block::new(1, 10_000.0).with_land_use(LandUse::Recreation),
//!         Block::new(2, 20_000.0).with_population(5_000),
//!     ],
//!     vec![ServiceCategory::new("schools", 100.0, 15.0)
//!         .with_land_use(LandUse::Residential)
//!         .with_brick(Brick::new(50.0, 500.0))],
//! )
//! .unwrap()
//! .with_symmetric_cost(1, 2, 5.0);
//!
//! let config = OptimizerConfig::new().with_max_facilities(15);
//! let assignment = BTreeMap::from([(1, LandUse::Residential)]);
//! let result = blockplan::calculate(&city, &assignment, None, config).unwrap();
//!
//! assert_eq!(result.allocation.capacity_delta(1, "schools"), 500.0);
//! ```

use std::collections::BTreeMap;

pub use blockplan_config::{BlockFailurePolicy, ConfigError, OptimizerConfig, TerminationConfig};
pub use blockplan_core::{
    AccessibilityProvider, AccessibilityRow, Block, BlockId, BlockPlanError, BlockProvision,
    BlocksTable, Brick, CityModel, InMemoryCity, LandUse, LandUseIndicator, ProvisionColumn,
    ProvisionEngine, ProvisionTable, Result, Scenario, ServiceCategory, ServiceInstance,
    SolveStatus, UpdateRow, UpdateTable,
};
pub use blockplan_optimizer::{
    BlockOptimizer, BlockReport, BuiltBrick, CalculationResult, CalculationWarning,
    EstimationConstants, GreedyProvision, ProvisionImpact, ServiceBalance, SkippedBlock,
};
pub use blockplan_solver::{MicroLpEngine, MilpEngine, SolveBudget, SolveOutcome};

#[cfg(feature = "console")]
pub mod console;

/// Runs one calculation against a city that is its own accessibility source.
pub fn calculate<C>(
    city: &C,
    assignment: &BTreeMap<BlockId, LandUse>,
    scenario: Option<&Scenario>,
    config: OptimizerConfig,
) -> Result<CalculationResult>
where
    C: CityModel + AccessibilityProvider,
{
    BlockOptimizer::new(city, city)
        .with_config(config)
        .calculate(assignment, scenario)
}

pub mod prelude {
    pub use super::{
        Block, BlockId, BlockOptimizer, BlockPlanError, Brick, CalculationResult, CityModel,
        GreedyProvision, InMemoryCity, LandUse, OptimizerConfig, ProvisionEngine, Scenario,
        ServiceCategory, UpdateRow, UpdateTable,
    };
}
