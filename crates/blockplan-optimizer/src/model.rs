//! Construction of the joint allocation program.
//!
//! Every converting block contributes its own variables and constraints;
//! blocks share only the objective. For each candidate service the objective
//! rewards `weight × (built + local capacity - local demand - added demand)`.

use blockplan_core::{BlockId, LandUse, Scenario, ServiceCategory};
use blockplan_solver::{LinearExpr, LinearProgram, Sense, VarId, VariableDef};
use tracing::debug;

use crate::context::BlockPlan;

/// Variables created for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockVariables {
    pub block: BlockId,
    /// One count per brick row, aligned with the block's catalog.
    pub bricks: Vec<VarId>,
    pub population: VarId,
}

/// The program together with its per-block variable map.
#[derive(Debug, Clone)]
pub struct AllocationModel {
    pub program: LinearProgram,
    pub blocks: Vec<BlockVariables>,
}

impl AllocationModel {
    pub fn variables(&self, block: BlockId) -> Option<&BlockVariables> {
        self.blocks.iter().find(|v| v.block == block)
    }
}

/// Objective weight of each candidate service.
///
/// Services the scenario names take its weight; the others share what is
/// left of 1 after the named ones. Empty when there are no candidates.
pub fn category_weights(scenario: &Scenario, candidates: &[ServiceCategory]) -> Vec<(String, f64)> {
    if candidates.is_empty() {
        return Vec::new();
    }
    let named = scenario.sum_over(candidates.iter().map(|c| c.name.as_str()));
    let default = (1.0 - named) / candidates.len() as f64;
    candidates
        .iter()
        .map(|c| (c.name.clone(), scenario.weight(&c.name).unwrap_or(default)))
        .collect()
}

/// Builds the allocation program from prepared block plans.
#[derive(Debug, Clone, Copy)]
pub struct ModelBuilder<'a> {
    scenario: &'a Scenario,
    max_facilities: Option<u32>,
    cap_population_at_ceiling: bool,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(scenario: &'a Scenario) -> Self {
        Self {
            scenario,
            max_facilities: None,
            cap_population_at_ceiling: false,
        }
    }

    /// Upper bound on every brick count.
    pub fn with_max_facilities(mut self, max_facilities: Option<u32>) -> Self {
        self.max_facilities = max_facilities;
        self
    }

    /// Bounds added population by the estimated ceiling.
    pub fn with_population_ceiling(mut self, enabled: bool) -> Self {
        self.cap_population_at_ceiling = enabled;
        self
    }

    pub fn build<'p, I>(&self, plans: I) -> AllocationModel
    where
        I: IntoIterator<Item = &'p BlockPlan>,
    {
        let mut program = LinearProgram::maximize("block_allocation");
        let blocks = plans
            .into_iter()
            .map(|plan| self.add_block(&mut program, plan))
            .collect();

        debug!(
            event = "program_built",
            variable_count = program.variable_count(),
            constraint_count = program.constraint_count(),
        );
        AllocationModel { program, blocks }
    }

    fn add_block(&self, program: &mut LinearProgram, plan: &BlockPlan) -> BlockVariables {
        let id = plan.block;
        let upper = self.max_facilities.map(f64::from);
        let bricks: Vec<VarId> = (0..plan.catalog.len())
            .map(|idx| {
                program.add_variable(
                    VariableDef::non_negative_integer(format!("block_{id}_brick_{idx}"))
                        .with_upper(upper),
                )
            })
            .collect();
        let population =
            program.add_variable(VariableDef::non_negative_integer(format!("block_{id}_population")));

        for (category, weight) in category_weights(self.scenario, &plan.candidates) {
            let Some(service) = plan.candidates.iter().find(|c| c.name == category) else {
                continue;
            };
            let balance = plan.constants.service(&category);

            let mut built = LinearExpr::zero();
            for idx in plan.catalog.indices_of(&category) {
                built.add_term(bricks[idx], plan.catalog.rows[idx].capacity);
            }
            let added_demand = LinearExpr::from_var(population, service.marginal_demand(1.0));

            let mut surplus = built.clone();
            surplus.add_constant(balance.capacity_local - balance.demand_local);
            surplus.sub_inplace(&added_demand);
            program.add_objective(&surplus.scale(weight));

            if balance.demand_local > 0.0 && balance.capacity_local < balance.demand_local {
                program.add_constraint(
                    format!("block_{id}_{category}_deficit"),
                    built,
                    Sense::Le,
                    balance.gap(),
                );
            }
            if balance.capacity_local > balance.demand_local
                && plan.target_land_use == LandUse::Residential
            {
                program.add_constraint(
                    format!("block_{id}_{category}_residents"),
                    added_demand,
                    Sense::Le,
                    -balance.gap(),
                );
            }
        }

        let mut built_area = LinearExpr::zero();
        for (idx, row) in plan.catalog.rows.iter().enumerate() {
            built_area.add_term(bricks[idx], row.area);
        }
        program.add_constraint(
            format!("block_{id}_fsi_min"),
            built_area.clone(),
            Sense::Ge,
            plan.indicator.min_built_area(plan.site_area),
        );
        program.add_constraint(
            format!("block_{id}_fsi_max"),
            built_area.clone(),
            Sense::Le,
            plan.indicator.max_built_area(plan.site_area),
        );
        program.add_constraint(
            format!("block_{id}_site_area"),
            built_area,
            Sense::Le,
            plan.site_area,
        );

        let ceiling = plan.constants.population_ceiling;
        if self.cap_population_at_ceiling && ceiling.is_finite() {
            program.add_constraint(
                format!("block_{id}_population_ceiling"),
                LinearExpr::from_var(population, 1.0),
                Sense::Le,
                ceiling,
            );
        }

        BlockVariables {
            block: id,
            bricks,
            population,
        }
    }
}

#[cfg(test)]
mod tests;
