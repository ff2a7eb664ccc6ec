//! Turns solved variable values into per-block deltas.

use std::collections::BTreeMap;

use blockplan_core::{BlockId, UpdateRow, UpdateTable};
use blockplan_solver::SolveOutcome;
use serde::{Deserialize, Serialize};

use crate::context::CalculationContext;
use crate::model::AllocationModel;

/// One brick option the solver chose to build, with its count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuiltBrick {
    pub category: String,
    pub capacity: f64,
    pub area: f64,
    pub is_integrated: bool,
    pub count: u32,
    pub built_capacity: f64,
    pub built_area: f64,
    /// Local demand minus local capacity of the category before building.
    pub demand_gap: f64,
}

/// Decoded allocation for every planned block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAllocation {
    pub updates: UpdateTable,
    pub breakdown: BTreeMap<BlockId, Vec<BuiltBrick>>,
    pub objective: f64,
}

/// Reads the solution of `model` back into update rows.
///
/// Counts are rounded to the nearest integer; options built zero times are
/// left out of both the update and the breakdown.
pub fn decode(
    model: &AllocationModel,
    context: &CalculationContext,
    outcome: &SolveOutcome,
) -> DecodedAllocation {
    let mut decoded = DecodedAllocation {
        objective: outcome.objective.unwrap_or(0.0),
        ..DecodedAllocation::default()
    };

    for vars in &model.blocks {
        let Some(plan) = context.plan(vars.block) else {
            continue;
        };
        let mut row = UpdateRow::new();
        let mut built = Vec::new();

        for (idx, var) in vars.bricks.iter().enumerate() {
            let count = outcome.value(*var).unwrap_or(0.0).round();
            if count <= 0.0 {
                continue;
            }
            let brick = &plan.catalog.rows[idx];
            let built_capacity = count * brick.capacity;
            row.add_capacity(brick.category.clone(), built_capacity);
            built.push(BuiltBrick {
                category: brick.category.clone(),
                capacity: brick.capacity,
                area: brick.area,
                is_integrated: brick.is_integrated,
                count: count as u32,
                built_capacity,
                built_area: count * brick.area,
                demand_gap: plan.constants.service(&brick.category).gap(),
            });
        }

        let population = outcome.value(vars.population).unwrap_or(0.0).round();
        if population > 0.0 {
            row.set_population(population);
        }

        decoded.updates.insert(vars.block, row);
        decoded.breakdown.insert(vars.block, built);
    }
    decoded
}

#[cfg(test)]
mod tests;
