//! Error types for blockplan

use std::time::Duration;

use thiserror::Error;

use crate::block::BlockId;
use crate::land_use::LandUse;
use crate::status::SolveStatus;

/// Main error type for blockplan operations
#[derive(Debug, Error)]
pub enum BlockPlanError {
    /// Scenario weight out of range or referencing an unknown category
    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    /// Catchment computation failed for a block
    #[error("Accessibility unavailable for block {block}: {reason}")]
    AccessibilityUnavailable { block: BlockId, reason: String },

    /// Block id not present in the city model
    #[error("Block {0} not found")]
    UnknownBlock(BlockId),

    /// Service category name not present in the city model
    #[error("Unknown service category `{0}`")]
    UnknownServiceCategory(String),

    /// No density indicator configured for a target land use
    #[error("No land use indicator for {0}")]
    MissingLandUseIndicator(LandUse),

    /// Block whose site area cannot bound a floor-space index
    #[error("Block {block} has degenerate site area {site_area}")]
    DegenerateBlock { block: BlockId, site_area: f64 },

    /// Solver finished without an optimal assignment
    #[error("Allocation program is {status}")]
    InfeasibleProgram { status: SolveStatus },

    /// Solver did not finish within its time budget
    ///
    /// The abandoned solve may keep running in the background until the
    /// backend returns on its own.
    #[error("Solver exceeded its time budget of {limit:?}")]
    SolverTimeout { limit: Duration },

    /// Backend failure unrelated to feasibility
    #[error("Solver error: {0}")]
    Solver(String),

    /// Error in optimizer configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BlockPlanError {
    /// Returns true for failures that concern a single block and may be
    /// isolated by skipping that block.
    pub fn is_block_local(&self) -> bool {
        matches!(
            self,
            BlockPlanError::AccessibilityUnavailable { .. }
                | BlockPlanError::DegenerateBlock { .. }
                | BlockPlanError::MissingLandUseIndicator(_)
        )
    }
}

/// Result type alias for blockplan operations
pub type Result<T> = std::result::Result<T, BlockPlanError>;
