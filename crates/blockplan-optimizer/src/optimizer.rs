//! The allocation pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use blockplan_config::{BlockFailurePolicy, OptimizerConfig};
use blockplan_core::{
    AccessibilityProvider, BlockId, BlockPlanError, CityModel, LandUse, ProvisionEngine, Result,
    Scenario, ServiceCategory,
};
use blockplan_solver::{MicroLpEngine, MilpEngine, SolveBudget};
use tracing::{debug, info, warn};

use crate::catalog::{BlockCatalog, CalculationWarning};
use crate::context::{BlockPlan, CalculationContext, SkippedBlock};
use crate::decoder::decode;
use crate::demolition::demolition_table;
use crate::estimator::estimate;
use crate::model::ModelBuilder;
use crate::provision::{evaluate_provision_impact, ProvisionImpact};
use crate::result::{BlockReport, CalculationResult};

/// Chooses facilities and added population for converting blocks.
///
/// Holds only shared references and configuration, so independent
/// calculations may run concurrently on the same optimizer.
///
/// # Example
///
/// ```ignore
/// let optimizer = BlockOptimizer::new(&city, &city).with_config(config);
/// let assignment = BTreeMap::from([(1, LandUse::Residential)]);
/// let result = optimizer.calculate(&assignment, None)?;
/// ```
pub struct BlockOptimizer<'a, C: ?Sized, A: ?Sized, E = MicroLpEngine> {
    city: &'a C,
    accessibility: &'a A,
    engine: E,
    config: OptimizerConfig,
}

impl<'a, C, A> BlockOptimizer<'a, C, A, MicroLpEngine>
where
    C: CityModel + ?Sized,
    A: AccessibilityProvider + ?Sized,
{
    /// Optimizer with default configuration and the microlp engine.
    pub fn new(city: &'a C, accessibility: &'a A) -> Self {
        Self {
            city,
            accessibility,
            engine: MicroLpEngine::new(),
            config: OptimizerConfig::default(),
        }
    }
}

impl<'a, C, A, E> BlockOptimizer<'a, C, A, E>
where
    C: CityModel + ?Sized,
    A: AccessibilityProvider + ?Sized,
    E: MilpEngine,
{
    pub fn with_config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Swaps the solving engine.
    pub fn with_engine<F: MilpEngine>(self, engine: F) -> BlockOptimizer<'a, C, A, F> {
        BlockOptimizer {
            city: self.city,
            accessibility: self.accessibility,
            engine,
            config: self.config,
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs the pipeline with the configured facility cap.
    pub fn calculate(
        &self,
        assignment: &BTreeMap<BlockId, LandUse>,
        scenario: Option<&Scenario>,
    ) -> Result<CalculationResult> {
        self.calculate_with_max_facilities(assignment, scenario, self.config.max_facilities)
    }

    /// Runs the pipeline with an explicit facility cap (`None` for no cap).
    pub fn calculate_with_max_facilities(
        &self,
        assignment: &BTreeMap<BlockId, LandUse>,
        scenario: Option<&Scenario>,
        max_facilities: Option<u32>,
    ) -> Result<CalculationResult> {
        let start = Instant::now();
        self.config.validate()?;
        if max_facilities == Some(0) {
            return Err(BlockPlanError::Config(
                "max_facilities must be positive".to_string(),
            ));
        }

        let scenario = scenario.cloned().unwrap_or_default();
        scenario.validate(|name| self.city.service_category(name).is_ok())?;

        info!(
            event = "calculate_start",
            block_count = assignment.len(),
            scenario_size = scenario.len(),
            max_facilities = ?max_facilities,
        );

        let mut context = CalculationContext::new(
            assignment.clone(),
            scenario,
            max_facilities,
            self.city.blocks_table(),
        );

        let mut first_failure = None;
        for (&id, &target) in assignment {
            match self.prepare_block(&mut context, id, target) {
                Ok(plan) => {
                    for category in &plan.catalog.missing {
                        warn!(event = "missing_brick_catalog", block = id, category = %category);
                        context.warnings.push(CalculationWarning::MissingBrickCatalog {
                            block: id,
                            category: category.clone(),
                        });
                    }
                    context.plans.insert(id, plan);
                }
                Err(err)
                    if self.config.on_block_failure == BlockFailurePolicy::SkipBlock
                        && err.is_block_local() =>
                {
                    warn!(event = "block_skipped", block = id, reason = %err);
                    context.skipped.push(SkippedBlock {
                        block: id,
                        reason: err.to_string(),
                    });
                    first_failure.get_or_insert(err);
                }
                Err(err) => return Err(err),
            }
        }

        if context.plans.is_empty() {
            if let Some(err) = first_failure {
                return Err(err);
            }
            info!(event = "calculate_end", block_count = 0, objective = 0.0);
            return Ok(CalculationResult::empty());
        }

        let model = ModelBuilder::new(&context.scenario)
            .with_max_facilities(max_facilities)
            .with_population_ceiling(self.config.cap_population_at_ceiling)
            .build(context.plans.values());

        let budget = SolveBudget::new(self.config.time_limit());
        let outcome = self.engine.solve(model.program.clone(), &budget)?;
        if !outcome.status.is_optimal() {
            warn!(event = "program_not_optimal", status = %outcome.status);
            return Err(BlockPlanError::InfeasibleProgram {
                status: outcome.status,
            });
        }

        let decoded = decode(&model, &context, &outcome);
        let demolition = demolition_table(self.city, context.plans.keys().copied())?;

        let blocks = context
            .plans
            .values()
            .map(|plan| {
                (
                    plan.block,
                    BlockReport {
                        block: plan.block,
                        original_land_use: plan.original_land_use,
                        target_land_use: plan.target_land_use,
                        site_area: plan.site_area,
                        free_area: plan.free_area,
                        constants: plan.constants.clone(),
                    },
                )
            })
            .collect();

        info!(
            event = "calculate_end",
            block_count = context.plans.len(),
            skipped_count = context.skipped.len(),
            objective = decoded.objective,
            duration_ms = start.elapsed().as_millis() as u64,
        );

        Ok(CalculationResult {
            allocation: decoded.updates,
            breakdown: decoded.breakdown,
            demolition,
            objective: decoded.objective,
            status: outcome.status,
            solve_duration: outcome.duration,
            blocks,
            warnings: context.warnings,
            skipped_blocks: context.skipped,
        })
    }

    /// Scores the provision impact of one block of `result`.
    pub fn evaluate_provision<P>(
        &self,
        engine: &P,
        result: &CalculationResult,
        block: BlockId,
    ) -> Result<ProvisionImpact>
    where
        P: ProvisionEngine + ?Sized,
    {
        let target = result
            .blocks
            .get(&block)
            .map(|report| report.target_land_use)
            .ok_or(BlockPlanError::UnknownBlock(block))?;
        evaluate_provision_impact(self.city, engine, block, target, result.allocation.get(block))
    }

    fn prepare_block(
        &self,
        context: &mut CalculationContext,
        id: BlockId,
        target: LandUse,
    ) -> Result<BlockPlan> {
        let block = self.city.block(id)?;
        if !block.has_valid_site_area() {
            return Err(BlockPlanError::DegenerateBlock {
                block: id,
                site_area: block.site_area,
            });
        }
        let indicator = self
            .config
            .indicator(target)
            .ok_or(BlockPlanError::MissingLandUseIndicator(target))?;

        let candidates = self.city.land_use_service_categories(Some(target));
        let original = self.city.land_use_service_categories(block.land_use);

        // Candidates first, then services the block loses.
        let candidate_names: BTreeSet<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
        let mut ordered: Vec<&ServiceCategory> = candidates.clone();
        ordered.extend(
            original
                .iter()
                .copied()
                .filter(|c| !candidate_names.contains(c.name.as_str())),
        );

        let catchment = context.catchments.rows(self.accessibility, id)?;
        let constants = estimate(id, &ordered, &context.table, catchment);
        debug!(
            event = "block_estimated",
            block = id,
            target = %target,
            service_count = ordered.len(),
            population_ceiling = constants.population_ceiling,
            bottleneck = ?constants.bottleneck,
        );

        Ok(BlockPlan {
            block: id,
            site_area: block.site_area,
            original_land_use: block.land_use,
            target_land_use: target,
            indicator,
            catalog: BlockCatalog::for_categories(&candidates),
            candidates: candidates.into_iter().cloned().collect(),
            constants,
            free_area: block.free_area(self.config.free_area_ratio),
        })
    }
}

#[cfg(test)]
mod tests;
