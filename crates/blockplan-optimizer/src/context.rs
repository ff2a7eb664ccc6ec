//! Per-calculation state.
//!
//! A [`CalculationContext`] is created for every `calculate()` call, filled
//! by estimation and catalog enumeration, read by the model builder and the
//! decoder, and dropped with the call. Nothing in it outlives the call.

use std::collections::BTreeMap;

use blockplan_core::{BlockId, BlocksTable, LandUse, LandUseIndicator, Scenario, ServiceCategory};
use serde::{Deserialize, Serialize};

use crate::catalog::{BlockCatalog, CalculationWarning};
use crate::estimator::{CatchmentCache, EstimationConstants};

/// Everything known about one converting block before solving.
#[derive(Debug, Clone)]
pub struct BlockPlan {
    pub block: BlockId,
    pub site_area: f64,
    pub original_land_use: Option<LandUse>,
    pub target_land_use: LandUse,
    pub indicator: LandUseIndicator,
    /// Services tied to the target land use, in city order.
    pub candidates: Vec<ServiceCategory>,
    pub constants: EstimationConstants,
    pub catalog: BlockCatalog,
    /// Advisory developable area.
    pub free_area: f64,
}

/// A block dropped from the program under the skip policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBlock {
    pub block: BlockId,
    pub reason: String,
}

/// State for one calculation.
#[derive(Debug)]
pub struct CalculationContext {
    pub assignment: BTreeMap<BlockId, LandUse>,
    pub scenario: Scenario,
    pub max_facilities: Option<u32>,
    pub table: BlocksTable,
    pub catchments: CatchmentCache,
    pub plans: BTreeMap<BlockId, BlockPlan>,
    pub warnings: Vec<CalculationWarning>,
    pub skipped: Vec<SkippedBlock>,
}

impl CalculationContext {
    pub fn new(
        assignment: BTreeMap<BlockId, LandUse>,
        scenario: Scenario,
        max_facilities: Option<u32>,
        table: BlocksTable,
    ) -> Self {
        Self {
            assignment,
            scenario,
            max_facilities,
            table,
            catchments: CatchmentCache::new(),
            plans: BTreeMap::new(),
            warnings: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn plan(&self, block: BlockId) -> Option<&BlockPlan> {
        self.plans.get(&block)
    }
}
