//! Provision scoring interface.
//!
//! Provision measures how much of a service's demand is met by capacity
//! reachable within the service's accessibility threshold. The engine that
//! assigns demand to capacity is external; this module fixes the shape of
//! its inputs and outputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::error::Result;
use crate::scenario::Scenario;
use crate::update::UpdateTable;

/// Provision figures for one block and one service category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockProvision {
    pub block: BlockId,
    pub demand: f64,
    pub capacity: f64,
    /// Demand served within the accessibility threshold.
    pub demand_within: f64,
    /// Demand served from beyond the accessibility threshold.
    pub demand_without: f64,
}

impl BlockProvision {
    /// Share of demand served within the threshold; 0 when there is no demand.
    pub fn provision(&self) -> f64 {
        if self.demand > 0.0 {
            self.demand_within / self.demand
        } else {
            0.0
        }
    }
}

/// Per-block provision of one service category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionColumn {
    pub category: String,
    pub rows: Vec<BlockProvision>,
}

impl ProvisionColumn {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            rows: Vec::new(),
        }
    }

    pub fn total_demand(&self) -> f64 {
        self.rows.iter().map(|r| r.demand).sum()
    }

    pub fn total_capacity(&self) -> f64 {
        self.rows.iter().map(|r| r.capacity).sum()
    }

    /// City-wide provision: served-within demand over total demand.
    pub fn total(&self) -> f64 {
        let demand = self.total_demand();
        if demand > 0.0 {
            self.rows.iter().map(|r| r.demand_within).sum::<f64>() / demand
        } else {
            0.0
        }
    }

    /// Provision reached if every block served only itself.
    pub fn lower_bound(&self) -> f64 {
        let demand = self.total_demand();
        if demand > 0.0 {
            self.rows
                .iter()
                .map(|r| r.capacity.min(r.demand))
                .sum::<f64>()
                / demand
        } else {
            0.0
        }
    }

    /// Provision reached if all capacity were reachable from everywhere.
    pub fn upper_bound(&self) -> f64 {
        let demand = self.total_demand();
        if demand > 0.0 {
            (self.total_capacity() / demand).min(1.0)
        } else {
            0.0
        }
    }

    pub fn get(&self, block: BlockId) -> Option<&BlockProvision> {
        self.rows.iter().find(|r| r.block == block)
    }
}

/// Provision columns keyed by service category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvisionTable {
    columns: BTreeMap<String, ProvisionColumn>,
}

impl ProvisionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: ProvisionColumn) {
        self.columns.insert(column.category.clone(), column);
    }

    pub fn column(&self, category: &str) -> Option<&ProvisionColumn> {
        self.columns.get(category)
    }

    pub fn columns(&self) -> impl Iterator<Item = &ProvisionColumn> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// City-wide provision scoring engine.
pub trait ProvisionEngine {
    /// Scores every category of `weights`, optionally with `update` applied.
    ///
    /// Returns the per-category table and the weighted total. With
    /// `self_supply`, each block first serves its own demand from its own
    /// capacity.
    fn evaluate(
        &self,
        weights: &Scenario,
        update: Option<&UpdateTable>,
        self_supply: bool,
    ) -> Result<(ProvisionTable, f64)>;

    /// City-wide provision of one column.
    fn total_provision(&self, column: &ProvisionColumn) -> f64 {
        column.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column() -> ProvisionColumn {
        ProvisionColumn {
            category: "schools".to_string(),
            rows: vec![
                BlockProvision {
                    block: 1,
                    demand: 100.0,
                    capacity: 40.0,
                    demand_within: 70.0,
                    demand_without: 10.0,
                },
                BlockProvision {
                    block: 2,
                    demand: 50.0,
                    capacity: 80.0,
                    demand_within: 50.0,
                    demand_without: 0.0,
                },
            ],
        }
    }

    #[test]
    fn test_totals() {
        let column = column();
        assert!((column.total() - 120.0 / 150.0).abs() < 1e-12);
        assert_eq!(column.get(1).unwrap().provision(), 0.7);
    }

    #[test]
    fn test_bounds() {
        let column = column();
        assert!((column.lower_bound() - 90.0 / 150.0).abs() < 1e-12);
        assert_eq!(column.upper_bound(), 0.8);
    }

    #[test]
    fn test_empty_demand_scores_zero() {
        let column = ProvisionColumn::new("parks");
        assert_eq!(column.total(), 0.0);
        assert_eq!(column.lower_bound(), 0.0);
        assert_eq!(column.upper_bound(), 0.0);
    }
}
