//! In-memory city backed by a travel-cost matrix.

use std::collections::{BTreeMap, HashSet};

use crate::block::{Block, BlockId};
use crate::city::{AccessibilityProvider, AccessibilityRow, CityModel};
use crate::error::{BlockPlanError, Result};
use crate::service::ServiceCategory;

/// A city held entirely in memory.
///
/// Travel costs are directed: `cost(a, b)` is the cost of going from `a` to
/// `b`. A block's cost to itself is zero; missing pairs are unreachable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCity {
    blocks: Vec<Block>,
    index: BTreeMap<BlockId, usize>,
    categories: Vec<ServiceCategory>,
    costs: BTreeMap<BlockId, BTreeMap<BlockId, f64>>,
}

impl InMemoryCity {
    /// Builds a city, checking ids are unique and installed services name
    /// known categories.
    pub fn new(blocks: Vec<Block>, categories: Vec<ServiceCategory>) -> Result<Self> {
        let mut names = HashSet::new();
        for category in &categories {
            if !names.insert(category.name.as_str()) {
                return Err(BlockPlanError::Config(format!(
                    "duplicate service category `{}`",
                    category.name
                )));
            }
        }

        let mut index = BTreeMap::new();
        for (position, block) in blocks.iter().enumerate() {
            if index.insert(block.id, position).is_some() {
                return Err(BlockPlanError::Config(format!(
                    "duplicate block id {}",
                    block.id
                )));
            }
            if let Some(service) = block
                .services
                .iter()
                .find(|s| !names.contains(s.category.as_str()))
            {
                return Err(BlockPlanError::UnknownServiceCategory(
                    service.category.clone(),
                ));
            }
        }

        Ok(Self {
            blocks,
            index,
            categories,
            costs: BTreeMap::new(),
        })
    }

    /// Sets the directed travel cost from `from` to `to`.
    pub fn with_travel_cost(mut self, from: BlockId, to: BlockId, cost: f64) -> Self {
        self.set_travel_cost(from, to, cost);
        self
    }

    /// Sets the same travel cost in both directions.
    pub fn with_symmetric_cost(self, a: BlockId, b: BlockId, cost: f64) -> Self {
        self.with_travel_cost(a, b, cost).with_travel_cost(b, a, cost)
    }

    pub fn set_travel_cost(&mut self, from: BlockId, to: BlockId, cost: f64) {
        self.costs.entry(from).or_default().insert(to, cost);
    }

    /// Directed travel cost, if the pair is connected.
    pub fn travel_cost(&self, from: BlockId, to: BlockId) -> Option<f64> {
        if from == to {
            return Some(0.0);
        }
        self.costs
            .get(&from)
            .and_then(|row| row.get(&to))
            .copied()
            .filter(|c| c.is_finite())
    }
}

impl CityModel for InMemoryCity {
    fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn service_categories(&self) -> &[ServiceCategory] {
        &self.categories
    }

    fn block(&self, id: BlockId) -> Result<&Block> {
        self.index
            .get(&id)
            .map(|position| &self.blocks[*position])
            .ok_or(BlockPlanError::UnknownBlock(id))
    }
}

impl AccessibilityProvider for InMemoryCity {
    fn accessibility(&self, block: BlockId) -> Result<Vec<AccessibilityRow>> {
        self.block(block)?;

        let rows: Vec<AccessibilityRow> = self
            .blocks
            .iter()
            .map(|other| AccessibilityRow {
                block: other.id,
                accessibility_to: self.travel_cost(block, other.id).unwrap_or(f64::INFINITY),
                accessibility_from: self.travel_cost(other.id, block).unwrap_or(f64::INFINITY),
            })
            .collect();

        let connected = rows.iter().any(|row| {
            row.block != block
                && (row.accessibility_to.is_finite() || row.accessibility_from.is_finite())
        });
        if rows.len() > 1 && !connected {
            return Err(BlockPlanError::AccessibilityUnavailable {
                block,
                reason: "block is not connected to any other block".to_string(),
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::land_use::LandUse;

    fn city() -> InMemoryCity {
        InMemoryCity::new(
            vec![
                Block::new(1, 1_000.0).with_service("schools", 10.0),
                Block::new(2, 1_000.0),
                Block::new(3, 1_000.0),
            ],
            vec![ServiceCategory::new("schools", 120.0, 15.0).with_land_use(LandUse::Residential)],
        )
        .unwrap()
        .with_travel_cost(1, 2, 5.0)
        .with_travel_cost(2, 1, 25.0)
    }

    #[test]
    fn test_directed_costs() {
        let city = city();
        assert_eq!(city.travel_cost(1, 2), Some(5.0));
        assert_eq!(city.travel_cost(2, 1), Some(25.0));
        assert_eq!(city.travel_cost(3, 3), Some(0.0));
        assert_eq!(city.travel_cost(1, 3), None);
    }

    #[test]
    fn test_accessibility_rows() {
        let rows = city().accessibility(2).unwrap();
        assert_eq!(rows.len(), 3);
        let to_one = rows.iter().find(|r| r.block == 1).unwrap();
        assert_eq!(to_one.accessibility_to, 25.0);
        assert_eq!(to_one.accessibility_from, 5.0);
        let own = rows.iter().find(|r| r.block == 2).unwrap();
        assert_eq!(own.accessibility_to, 0.0);
    }

    #[test]
    fn test_isolated_block_is_an_error() {
        let err = city().accessibility(3).unwrap_err();
        assert!(matches!(
            err,
            BlockPlanError::AccessibilityUnavailable { block: 3, .. }
        ));
    }

    #[test]
    fn test_unknown_block() {
        assert!(matches!(
            city().accessibility(42),
            Err(BlockPlanError::UnknownBlock(42))
        ));
    }

    #[test]
    fn test_rejects_unknown_service_category() {
        let err = InMemoryCity::new(vec![Block::new(1, 10.0).with_service("opera", 1.0)], vec![])
            .unwrap_err();
        assert!(matches!(err, BlockPlanError::UnknownServiceCategory(_)));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = InMemoryCity::new(vec![Block::new(1, 10.0), Block::new(1, 20.0)], vec![])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate block id"));
    }
}
