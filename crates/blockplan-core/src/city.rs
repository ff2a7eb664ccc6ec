//! Interfaces to the external city model and accessibility source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockId};
use crate::error::{BlockPlanError, Result};
use crate::land_use::LandUse;
use crate::service::ServiceCategory;

/// Read access to a city's blocks and service categories.
pub trait CityModel {
    /// All blocks of the city, in a stable order.
    fn blocks(&self) -> &[Block];

    /// All service categories of the city, in a stable order.
    fn service_categories(&self) -> &[ServiceCategory];

    /// Looks up a block by id.
    fn block(&self, id: BlockId) -> Result<&Block> {
        self.blocks()
            .iter()
            .find(|b| b.id == id)
            .ok_or(BlockPlanError::UnknownBlock(id))
    }

    /// Looks up a service category by name.
    fn service_category(&self, name: &str) -> Result<&ServiceCategory> {
        self.service_categories()
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| BlockPlanError::UnknownServiceCategory(name.to_string()))
    }

    /// Service categories tied to a land use; empty for blocks without one.
    fn land_use_service_categories(&self, land_use: Option<LandUse>) -> Vec<&ServiceCategory> {
        match land_use {
            Some(land_use) => self
                .service_categories()
                .iter()
                .filter(|s| s.is_tied_to(land_use))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Tabular view: population and per-category capacity of every block.
    fn blocks_table(&self) -> BlocksTable {
        BlocksTable::from_blocks(self.blocks())
    }
}

/// Travel costs between a focal block and another block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityRow {
    pub block: BlockId,
    /// Cost of travelling from the focal block to `block`.
    pub accessibility_to: f64,
    /// Cost of travelling from `block` to the focal block.
    pub accessibility_from: f64,
}

impl AccessibilityRow {
    /// True when either direction is within `threshold`.
    pub fn within(&self, threshold: f64) -> bool {
        self.accessibility_to <= threshold || self.accessibility_from <= threshold
    }
}

/// Source of travel costs relative to a focal block.
pub trait AccessibilityProvider {
    fn accessibility(&self, block: BlockId) -> Result<Vec<AccessibilityRow>>;
}

/// Population and installed capacity of one block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub population: f64,
    pub capacities: BTreeMap<String, f64>,
}

impl BlockRecord {
    pub fn capacity(&self, category: &str) -> f64 {
        self.capacities.get(category).copied().unwrap_or(0.0)
    }
}

/// Per-block population and capacity columns for the whole city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlocksTable {
    rows: BTreeMap<BlockId, BlockRecord>,
}

impl BlocksTable {
    pub fn from_blocks(blocks: &[Block]) -> Self {
        let rows = blocks
            .iter()
            .map(|block| {
                let mut record = BlockRecord {
                    population: block.population as f64,
                    capacities: BTreeMap::new(),
                };
                for service in &block.services {
                    *record
                        .capacities
                        .entry(service.category.clone())
                        .or_insert(0.0) += service.capacity;
                }
                (block.id, record)
            })
            .collect();
        Self { rows }
    }

    pub fn get(&self, block: BlockId) -> Option<&BlockRecord> {
        self.rows.get(&block)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &BlockRecord)> {
        self.rows.iter().map(|(k, v)| (*k, v))
    }

    pub fn population(&self, block: BlockId) -> f64 {
        self.get(block).map(|r| r.population).unwrap_or(0.0)
    }

    pub fn capacity(&self, block: BlockId, category: &str) -> f64 {
        self.get(block).map(|r| r.capacity(category)).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
