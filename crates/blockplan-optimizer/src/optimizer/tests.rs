use std::cell::Cell;
use std::time::Duration;

use blockplan_core::{
    AccessibilityRow, Block, Brick, InMemoryCity, LandUseIndicator, ServiceCategory, SolveStatus,
};
use blockplan_test::{conversion_city, CityFixture, ScriptedEngine};

use super::*;

fn residential(block: BlockId) -> BTreeMap<BlockId, LandUse> {
    BTreeMap::from([(block, LandUse::Residential)])
}

fn optimal() -> ScriptedEngine {
    ScriptedEngine::status(SolveStatus::Optimal)
}

#[test]
fn test_scenario_weight_out_of_range() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());
    let scenario = Scenario::new().with_weight("schools", 1.5);

    let err = optimizer
        .calculate(&residential(1), Some(&scenario))
        .unwrap_err();
    assert!(matches!(err, BlockPlanError::InvalidScenario(_)));
    assert!(optimizer.engine().programs().is_empty());
}

#[test]
fn test_scenario_unknown_category() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());
    let scenario = Scenario::new().with_weight("opera", 0.2);

    let err = optimizer
        .calculate(&residential(1), Some(&scenario))
        .unwrap_err();
    assert!(matches!(err, BlockPlanError::InvalidScenario(_)));
}

#[test]
fn test_non_optimal_status_is_infeasible_program() {
    let city = conversion_city();
    for status in [
        SolveStatus::Infeasible,
        SolveStatus::Unbounded,
        SolveStatus::NotSolved,
    ] {
        let optimizer =
            BlockOptimizer::new(&city, &city).with_engine(ScriptedEngine::status(status));
        let err = optimizer.calculate(&residential(1), None).unwrap_err();
        assert!(matches!(
            err,
            BlockPlanError::InfeasibleProgram { status: s } if s == status
        ));
    }
}

#[test]
fn test_timeout_is_distinct_from_infeasibility() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city)
        .with_config(OptimizerConfig::new().with_time_limit_seconds(3))
        .with_engine(ScriptedEngine::timeout());

    let err = optimizer.calculate(&residential(1), None).unwrap_err();
    assert!(matches!(
        err,
        BlockPlanError::SolverTimeout { limit } if limit == Duration::from_secs(3)
    ));
}

#[test]
fn test_one_program_for_all_blocks() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());
    let assignment = BTreeMap::from([(1, LandUse::Residential), (2, LandUse::Business)]);

    let result = optimizer.calculate(&assignment, None).unwrap();

    let programs = optimizer.engine().programs();
    assert_eq!(programs.len(), 1);
    // Block 1: one brick and a population variable. Block 2: population only.
    assert_eq!(programs[0].variable_count(), 3);
    assert_eq!(result.blocks.len(), 2);
    assert_eq!(result.blocks[&2].target_land_use, LandUse::Business);
}

#[test]
fn test_missing_catalog_is_a_warning() {
    let city = CityFixture::new()
        .with_category(
            ServiceCategory::new("schools", 100.0, 15.0).with_land_use(LandUse::Residential),
        )
        .with_block(Block::new(1, 10_000.0))
        .with_block(Block::new(2, 10_000.0).with_population(1_000))
        .connect(1, 2, 5.0)
        .build();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());

    let result = optimizer.calculate(&residential(1), None).unwrap();
    assert_eq!(
        result.warnings,
        vec![CalculationWarning::MissingBrickCatalog {
            block: 1,
            category: "schools".to_string()
        }]
    );
}

#[test]
fn test_missing_indicator() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());
    let assignment = BTreeMap::from([(1, LandUse::MixedUse)]);

    let err = optimizer.calculate(&assignment, None).unwrap_err();
    assert!(matches!(
        err,
        BlockPlanError::MissingLandUseIndicator(LandUse::MixedUse)
    ));

    let optimizer = optimizer.with_config(
        OptimizerConfig::new()
            .with_indicator(LandUse::MixedUse, LandUseIndicator::new(0.5, 2.0, 0.0, 0.8)),
    );
    assert!(optimizer.calculate(&assignment, None).is_ok());
}

#[test]
fn test_degenerate_and_unknown_blocks() {
    let city = CityFixture::new()
        .with_block(Block::new(1, 0.0))
        .with_block(Block::new(2, 100.0))
        .connect(1, 2, 1.0)
        .build();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());

    assert!(matches!(
        optimizer.calculate(&residential(1), None),
        Err(BlockPlanError::DegenerateBlock { block: 1, .. })
    ));
    assert!(matches!(
        optimizer.calculate(&residential(9), None),
        Err(BlockPlanError::UnknownBlock(9))
    ));
}

fn city_with_isolated_block() -> InMemoryCity {
    CityFixture::new()
        .with_category(
            ServiceCategory::new("schools", 100.0, 15.0)
                .with_land_use(LandUse::Residential)
                .with_brick(Brick::new(50.0, 500.0)),
        )
        .with_block(Block::new(1, 10_000.0))
        .with_block(Block::new(2, 10_000.0).with_population(5_000))
        .with_block(Block::new(3, 10_000.0))
        .connect(1, 2, 5.0)
        .build()
}

#[test]
fn test_abort_policy_propagates_block_failure() {
    let city = city_with_isolated_block();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());
    let assignment = BTreeMap::from([(1, LandUse::Residential), (3, LandUse::Residential)]);

    let err = optimizer.calculate(&assignment, None).unwrap_err();
    assert!(matches!(
        err,
        BlockPlanError::AccessibilityUnavailable { block: 3, .. }
    ));
}

#[test]
fn test_skip_policy_drops_failing_block() {
    let city = city_with_isolated_block();
    let optimizer = BlockOptimizer::new(&city, &city)
        .with_config(OptimizerConfig::new().with_failure_policy(BlockFailurePolicy::SkipBlock))
        .with_engine(optimal());
    let assignment = BTreeMap::from([(1, LandUse::Residential), (3, LandUse::Residential)]);

    let result = optimizer.calculate(&assignment, None).unwrap();
    assert!(result.is_skipped(3));
    assert!(!result.is_skipped(1));
    assert!(result.blocks.contains_key(&1));
    assert!(!result.blocks.contains_key(&3));
    assert!(result.demolition.get(3).is_none());

    let only_failing = BTreeMap::from([(3, LandUse::Residential)]);
    assert!(matches!(
        optimizer.calculate(&only_failing, None),
        Err(BlockPlanError::AccessibilityUnavailable { block: 3, .. })
    ));
}

#[test]
fn test_empty_assignment() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());

    let result = optimizer.calculate(&BTreeMap::new(), None).unwrap();
    assert!(result.allocation.is_empty());
    assert!(optimizer.engine().programs().is_empty());
}

#[test]
fn test_zero_facility_cap_is_rejected() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());

    let err = optimizer
        .calculate_with_max_facilities(&residential(1), None, Some(0))
        .unwrap_err();
    assert!(matches!(err, BlockPlanError::Config(_)));
}

#[test]
fn test_estimation_order_and_advisory_data() {
    let city = CityFixture::new()
        .with_category(
            ServiceCategory::new("parks", 0.0, 30.0).with_land_use(LandUse::Recreation),
        )
        .with_category(
            ServiceCategory::new("schools", 100.0, 15.0)
                .with_land_use(LandUse::Residential)
                .with_brick(Brick::new(50.0, 500.0)),
        )
        .with_block(
            Block::new(1, 10_000.0)
                .with_land_use(LandUse::Recreation)
                .with_service("parks", 10.0),
        )
        .with_block(Block::new(2, 10_000.0).with_population(2_000))
        .connect(1, 2, 5.0)
        .build();
    let optimizer = BlockOptimizer::new(&city, &city).with_engine(optimal());

    let result = optimizer.calculate(&residential(1), None).unwrap();

    let report = &result.blocks[&1];
    let margins: Vec<&str> = report
        .constants
        .global_margins
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(margins, vec!["schools", "parks"]);
    assert_eq!(report.constants.bottleneck.as_deref(), Some("schools"));
    assert_eq!(report.constants.population_ceiling, 0.0);
    assert_eq!(report.free_area, 8_000.0);
    assert_eq!(report.original_land_use, Some(LandUse::Recreation));
    assert_eq!(result.demolition.capacity_delta(1, "parks"), -10.0);
}

struct CountingAccessibility<'a> {
    city: &'a InMemoryCity,
    calls: Cell<usize>,
}

impl AccessibilityProvider for CountingAccessibility<'_> {
    fn accessibility(&self, block: BlockId) -> Result<Vec<AccessibilityRow>> {
        self.calls.set(self.calls.get() + 1);
        self.city.accessibility(block)
    }
}

#[test]
fn test_catchments_are_not_shared_across_calls() {
    let city = conversion_city();
    let accessibility = CountingAccessibility {
        city: &city,
        calls: Cell::new(0),
    };
    let optimizer = BlockOptimizer::new(&city, &accessibility).with_engine(optimal());

    optimizer.calculate(&residential(1), None).unwrap();
    assert_eq!(accessibility.calls.get(), 1);
    optimizer.calculate(&residential(1), None).unwrap();
    assert_eq!(accessibility.calls.get(), 2);
}
