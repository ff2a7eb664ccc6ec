use std::collections::BTreeMap;
use std::time::Duration;

use blockplan_core::{
    BlocksTable, Brick, LandUse, LandUseIndicator, Scenario, ServiceCategory, SolveStatus,
};

use super::*;
use crate::catalog::BlockCatalog;
use crate::context::BlockPlan;
use crate::estimator::{EstimationConstants, ServiceBalance};
use crate::model::ModelBuilder;

fn context() -> CalculationContext {
    let schools = ServiceCategory::new("schools", 100.0, 15.0)
        .with_brick(Brick::new(50.0, 500.0))
        .with_brick(Brick::new(120.0, 1_000.0).integrated());
    let pharmacies =
        ServiceCategory::new("pharmacies", 10.0, 10.0).with_brick(Brick::new(20.0, 100.0));
    let catalog = BlockCatalog::for_categories(&[&schools, &pharmacies]);

    let mut services = BTreeMap::new();
    services.insert(
        "schools".to_string(),
        ServiceBalance {
            demand_local: 600.0,
            capacity_local: 100.0,
        },
    );

    let mut context = CalculationContext::new(
        BTreeMap::from([(3, LandUse::Residential)]),
        Scenario::new(),
        None,
        BlocksTable::default(),
    );
    context.plans.insert(
        3,
        BlockPlan {
            block: 3,
            site_area: 10_000.0,
            original_land_use: None,
            target_land_use: LandUse::Residential,
            indicator: LandUseIndicator::new(0.5, 3.0, 0.2, 0.8),
            candidates: vec![schools, pharmacies],
            constants: EstimationConstants {
                services,
                global_margins: Vec::new(),
                population_ceiling: f64::INFINITY,
                bottleneck: None,
            },
            catalog,
            free_area: 8_000.0,
        },
    );
    context
}

fn outcome(values: Vec<f64>) -> SolveOutcome {
    SolveOutcome {
        status: SolveStatus::Optimal,
        values,
        objective: Some(42.5),
        duration: Duration::from_millis(3),
    }
}

#[test]
fn test_decode_rounds_and_aggregates() {
    let context = context();
    let model = ModelBuilder::new(&context.scenario).build(context.plans.values());

    // Three brick rows, then the population variable.
    let decoded = decode(&model, &context, &outcome(vec![2.0000001, 0.9999, 0.0, 349.6]));

    let row = decoded.updates.get(3).unwrap();
    assert_eq!(row.capacity("schools"), Some(2.0 * 50.0 + 120.0));
    assert_eq!(row.capacity("pharmacies"), None);
    assert_eq!(row.population(), Some(350.0));
    assert_eq!(decoded.objective, 42.5);

    let built = &decoded.breakdown[&3];
    assert_eq!(built.len(), 2);
    assert_eq!(built[0].count, 2);
    assert_eq!(built[0].built_area, 1_000.0);
    assert_eq!(built[0].demand_gap, 500.0);
    assert_eq!(built[1].count, 1);
    assert!(built[1].is_integrated);
    assert_eq!(built[1].built_capacity, 120.0);
}

#[test]
fn test_decode_empty_build() {
    let context = context();
    let model = ModelBuilder::new(&context.scenario).build(context.plans.values());

    let decoded = decode(&model, &context, &outcome(vec![0.0, 0.2, 0.0, 0.0]));

    let row = decoded.updates.get(3).unwrap();
    assert!(row.is_empty());
    assert!(decoded.breakdown[&3].is_empty());
}
