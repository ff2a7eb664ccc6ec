//! Output of one calculation.

use std::collections::BTreeMap;
use std::time::Duration;

use blockplan_core::{BlockId, LandUse, SolveStatus, UpdateRow, UpdateTable};
use serde::Serialize;

use crate::catalog::CalculationWarning;
use crate::context::SkippedBlock;
use crate::decoder::BuiltBrick;
use crate::estimator::EstimationConstants;

/// Advisory figures for one planned block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockReport {
    pub block: BlockId,
    pub original_land_use: Option<LandUse>,
    pub target_land_use: LandUse,
    pub site_area: f64,
    pub free_area: f64,
    pub constants: EstimationConstants,
}

/// Deltas and diagnostics produced by `calculate()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    /// Added capacity and population per block.
    pub allocation: UpdateTable,
    /// Chosen bricks per block.
    pub breakdown: BTreeMap<BlockId, Vec<BuiltBrick>>,
    /// Removal of existing services and residents per block.
    pub demolition: UpdateTable,
    pub objective: f64,
    pub status: SolveStatus,
    pub solve_duration: Duration,
    pub blocks: BTreeMap<BlockId, BlockReport>,
    pub warnings: Vec<CalculationWarning>,
    pub skipped_blocks: Vec<SkippedBlock>,
}

impl CalculationResult {
    pub(crate) fn empty() -> Self {
        Self {
            allocation: UpdateTable::new(),
            breakdown: BTreeMap::new(),
            demolition: UpdateTable::new(),
            objective: 0.0,
            status: SolveStatus::Optimal,
            solve_duration: Duration::ZERO,
            blocks: BTreeMap::new(),
            warnings: Vec::new(),
            skipped_blocks: Vec::new(),
        }
    }

    pub fn built_bricks(&self, block: BlockId) -> &[BuiltBrick] {
        self.breakdown.get(&block).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn built_area(&self, block: BlockId) -> f64 {
        self.built_bricks(block).iter().map(|b| b.built_area).sum()
    }

    /// Allocation of `block` merged with its demolition.
    pub fn net_row(&self, block: BlockId) -> UpdateRow {
        let allocation = self.allocation.get(block).cloned().unwrap_or_default();
        match self.demolition.get(block) {
            Some(demolition) => allocation.merged(demolition),
            None => allocation,
        }
    }

    pub fn is_skipped(&self, block: BlockId) -> bool {
        self.skipped_blocks.iter().any(|s| s.block == block)
    }
}
