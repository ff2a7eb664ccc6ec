//! Provision engine double.

use std::cell::RefCell;
use std::collections::BTreeMap;

use blockplan_core::{
    BlockProvision, ProvisionColumn, ProvisionEngine, ProvisionTable, Result, Scenario,
    UpdateTable,
};

/// Arguments of one `evaluate` call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub weights: Scenario,
    pub update: Option<UpdateTable>,
    pub self_supply: bool,
}

/// Records every call and scores each category as
/// `min(capacity, 100) / 100`, where capacity is the configured base plus the
/// update's deltas for that category across all blocks.
#[derive(Debug, Default)]
pub struct RecordingProvision {
    base: BTreeMap<String, f64>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl RecordingProvision {
    pub const DEMAND: f64 = 100.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, category: impl Into<String>, capacity: f64) -> Self {
        self.base.insert(category.into(), capacity);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl ProvisionEngine for RecordingProvision {
    fn evaluate(
        &self,
        weights: &Scenario,
        update: Option<&UpdateTable>,
        self_supply: bool,
    ) -> Result<(ProvisionTable, f64)> {
        self.calls.borrow_mut().push(RecordedCall {
            weights: weights.clone(),
            update: update.cloned(),
            self_supply,
        });

        let mut table = ProvisionTable::new();
        let mut total = 0.0;
        for (name, weight) in weights.iter() {
            let delta: f64 = update
                .map(|u| u.blocks().map(|b| u.capacity_delta(b, name)).sum())
                .unwrap_or(0.0);
            let capacity = (self.base.get(name).copied().unwrap_or(0.0) + delta).max(0.0);
            let mut column = ProvisionColumn::new(name);
            column.rows.push(BlockProvision {
                block: 0,
                demand: Self::DEMAND,
                capacity,
                demand_within: capacity.min(Self::DEMAND),
                demand_without: 0.0,
            });
            total += weight * self.total_provision(&column);
            table.insert(column);
        }
        Ok((table, total))
    }
}
