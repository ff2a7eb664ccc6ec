//! Capacity and population deltas applied to blocks.
//!
//! Both the optimizer's additions and the demolition of existing
//! installations are expressed as [`UpdateRow`]s collected in an
//! [`UpdateTable`]. Rows merge additively, so a demolition row merged with an
//! allocation row yields the net change of clearing and rebuilding a block.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// Column name used for the population delta in tabular views.
pub const POPULATION_COLUMN: &str = "population";

/// Deltas for one block: capacity per service category and population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRow {
    capacities: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    population: Option<f64>,
}

impl UpdateRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, category: impl Into<String>, delta: f64) -> Self {
        self.add_capacity(category, delta);
        self
    }

    pub fn with_population(mut self, delta: f64) -> Self {
        self.population = Some(delta);
        self
    }

    /// Accumulates a capacity delta for a category.
    pub fn add_capacity(&mut self, category: impl Into<String>, delta: f64) {
        *self.capacities.entry(category.into()).or_insert(0.0) += delta;
    }

    pub fn set_population(&mut self, delta: f64) {
        self.population = Some(delta);
    }

    pub fn capacity(&self, category: &str) -> Option<f64> {
        self.capacities.get(category).copied()
    }

    pub fn population(&self) -> Option<f64> {
        self.population
    }

    pub fn capacities(&self) -> impl Iterator<Item = (&str, f64)> {
        self.capacities.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.capacities.is_empty() && self.population.is_none()
    }

    /// True when every present delta is zero.
    pub fn is_zero(&self) -> bool {
        self.capacities.values().all(|v| *v == 0.0) && self.population.unwrap_or(0.0) == 0.0
    }

    /// Adds `other` into this row.
    ///
    /// Keys present on both sides are summed. Keys only in `other` are copied
    /// when their delta is non-zero, so merging an all-zero row never changes
    /// the shape of this one.
    pub fn merge_from(&mut self, other: &UpdateRow) {
        for (category, delta) in &other.capacities {
            match self.capacities.get_mut(category) {
                Some(existing) => *existing += delta,
                None if *delta != 0.0 => {
                    self.capacities.insert(category.clone(), *delta);
                }
                None => {}
            }
        }
        match (self.population.as_mut(), other.population) {
            (Some(existing), Some(delta)) => *existing += delta,
            (None, Some(delta)) if delta != 0.0 => self.population = Some(delta),
            _ => {}
        }
    }

    pub fn merged(mut self, other: &UpdateRow) -> Self {
        self.merge_from(other);
        self
    }
}

/// Update rows keyed by block id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateTable {
    rows: BTreeMap<BlockId, UpdateRow>,
}

impl UpdateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the row of a block.
    pub fn insert(&mut self, block: BlockId, row: UpdateRow) {
        self.rows.insert(block, row);
    }

    /// Merges a row into the block's existing row, or inserts it.
    pub fn merge_row(&mut self, block: BlockId, row: &UpdateRow) {
        match self.rows.get_mut(&block) {
            Some(existing) => existing.merge_from(row),
            None => {
                self.rows.insert(block, row.clone());
            }
        }
    }

    /// Merges every row of `other` into a copy of this table.
    pub fn merged(&self, other: &UpdateTable) -> UpdateTable {
        let mut table = self.clone();
        for (block, row) in other.iter() {
            table.merge_row(block, row);
        }
        table
    }

    pub fn get(&self, block: BlockId) -> Option<&UpdateRow> {
        self.rows.get(&block)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &UpdateRow)> {
        self.rows.iter().map(|(k, v)| (*k, v))
    }

    pub fn blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.rows.keys().copied()
    }

    /// Capacity delta of a category on a block; absent entries read as zero.
    pub fn capacity_delta(&self, block: BlockId, category: &str) -> f64 {
        self.get(block)
            .and_then(|row| row.capacity(category))
            .unwrap_or(0.0)
    }

    /// Population delta of a block; absent entries read as zero.
    pub fn population_delta(&self, block: BlockId) -> f64 {
        self.get(block)
            .and_then(UpdateRow::population)
            .unwrap_or(0.0)
    }

    /// Union of the category columns used by any row.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.rows
            .values()
            .flat_map(|row| row.capacities.keys().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(BlockId, UpdateRow)> for UpdateTable {
    fn from_iter<T: IntoIterator<Item = (BlockId, UpdateRow)>>(iter: T) -> Self {
        let mut table = UpdateTable::new();
        for (block, row) in iter {
            table.merge_row(block, &row);
        }
        table
    }
}
