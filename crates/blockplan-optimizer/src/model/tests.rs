use std::collections::BTreeMap;

use blockplan_core::{Brick, LandUseIndicator};

use super::*;
use crate::catalog::BlockCatalog;
use crate::estimator::{EstimationConstants, ServiceBalance};

fn schools() -> ServiceCategory {
    ServiceCategory::new("schools", 100.0, 15.0)
        .with_land_use(LandUse::Residential)
        .with_brick(Brick::new(50.0, 500.0))
}

fn pharmacies() -> ServiceCategory {
    ServiceCategory::new("pharmacies", 10.0, 10.0)
        .with_land_use(LandUse::Residential)
        .with_brick(Brick::new(20.0, 100.0))
}

fn plan(candidates: Vec<ServiceCategory>, balances: &[(&str, f64, f64)]) -> BlockPlan {
    let services: BTreeMap<String, ServiceBalance> = balances
        .iter()
        .map(|(name, demand_local, capacity_local)| {
            (
                name.to_string(),
                ServiceBalance {
                    demand_local: *demand_local,
                    capacity_local: *capacity_local,
                },
            )
        })
        .collect();
    let refs: Vec<&ServiceCategory> = candidates.iter().collect();
    let catalog = BlockCatalog::for_categories(&refs);
    BlockPlan {
        block: 7,
        site_area: 10_000.0,
        original_land_use: Some(LandUse::Recreation),
        target_land_use: LandUse::Residential,
        indicator: LandUseIndicator::new(0.5, 3.0, 0.2, 0.8),
        candidates,
        constants: EstimationConstants {
            services,
            global_margins: Vec::new(),
            population_ceiling: 1_200.0,
            bottleneck: Some("schools".to_string()),
        },
        catalog,
        free_area: 8_000.0,
    }
}

fn constraint<'m>(model: &'m AllocationModel, name: &str) -> Option<&'m blockplan_solver::Constraint> {
    model.program.constraints().iter().find(|c| c.name == name)
}

#[test]
fn test_default_weights_share_the_remainder() {
    let candidates = vec![schools(), pharmacies()];

    let weights = category_weights(&Scenario::new(), &candidates);
    assert_eq!(
        weights,
        vec![("schools".to_string(), 0.5), ("pharmacies".to_string(), 0.5)]
    );

    let scenario = Scenario::new()
        .with_weight("schools", 0.8)
        .with_weight("hospitals", 0.9);
    let weights = category_weights(&scenario, &candidates);
    assert!((weights[0].1 - 0.8).abs() < 1e-12);
    // The remainder is spread over every candidate, named or not.
    assert!((weights[1].1 - 0.1).abs() < 1e-12);

    assert!(category_weights(&scenario, &[]).is_empty());
}

#[test]
fn test_deficit_bounds_the_build() {
    let plan = plan(vec![schools()], &[("schools", 600.0, 100.0)]);
    let model = ModelBuilder::new(&Scenario::new()).build([&plan]);

    let deficit = constraint(&model, "block_7_schools_deficit").unwrap();
    assert_eq!(deficit.sense, Sense::Le);
    assert_eq!(deficit.rhs, 500.0);
    let vars = model.variables(7).unwrap();
    assert_eq!(deficit.expr.coefficient(vars.bricks[0]), 50.0);
    assert!(constraint(&model, "block_7_schools_residents").is_none());
}

#[test]
fn test_residential_surplus_bounds_new_residents() {
    let plan = plan(vec![schools()], &[("schools", 100.0, 400.0)]);
    let model = ModelBuilder::new(&Scenario::new()).build([&plan]);

    let residents = constraint(&model, "block_7_schools_residents").unwrap();
    let vars = model.variables(7).unwrap();
    assert_eq!(residents.rhs, 300.0);
    assert!((residents.expr.coefficient(vars.population) - 0.1).abs() < 1e-12);
    assert_eq!(
        residents.expr.coefficient(vars.population),
        schools().marginal_demand(1.0)
    );
    assert!(constraint(&model, "block_7_schools_deficit").is_none());
}

#[test]
fn test_objective_terms() {
    let plan = plan(
        vec![schools(), pharmacies()],
        &[("schools", 600.0, 100.0), ("pharmacies", 30.0, 30.0)],
    );
    let scenario = Scenario::new().with_weight("schools", 0.6);
    let model = ModelBuilder::new(&scenario).build([&plan]);
    let vars = model.variables(7).unwrap();
    let objective = model.program.objective();

    assert!((objective.coefficient(vars.bricks[0]) - 0.6 * 50.0).abs() < 1e-9);
    assert!((objective.coefficient(vars.bricks[1]) - 0.2 * 20.0).abs() < 1e-9);
    let population = -(0.6 * 0.1 + 0.2 * 0.01);
    assert!((objective.coefficient(vars.population) - population).abs() < 1e-9);
    assert!((objective.constant() - 0.6 * -500.0).abs() < 1e-9);
}

#[test]
fn test_density_and_site_constraints() {
    let plan = plan(vec![schools()], &[("schools", 0.0, 0.0)]);
    let model = ModelBuilder::new(&Scenario::new())
        .with_max_facilities(Some(15))
        .build([&plan]);

    assert_eq!(constraint(&model, "block_7_fsi_min").unwrap().rhs, 5_000.0);
    assert_eq!(constraint(&model, "block_7_fsi_max").unwrap().rhs, 30_000.0);
    assert_eq!(constraint(&model, "block_7_site_area").unwrap().rhs, 10_000.0);

    let vars = model.variables(7).unwrap();
    assert_eq!(model.program.variable(vars.bricks[0]).upper, Some(15.0));
    assert_eq!(model.program.variable(vars.population).upper, None);
}

#[test]
fn test_population_ceiling_is_opt_in() {
    let plan = plan(vec![schools()], &[("schools", 0.0, 0.0)]);

    let model = ModelBuilder::new(&Scenario::new()).build([&plan]);
    assert!(constraint(&model, "block_7_population_ceiling").is_none());

    let model = ModelBuilder::new(&Scenario::new())
        .with_population_ceiling(true)
        .build([&plan]);
    assert_eq!(
        constraint(&model, "block_7_population_ceiling").unwrap().rhs,
        1_200.0
    );
}

#[test]
fn test_block_without_candidates_keeps_only_area_rows() {
    let plan = plan(Vec::new(), &[]);
    let model = ModelBuilder::new(&Scenario::new()).build([&plan]);

    assert_eq!(model.program.constraint_count(), 3);
    assert!(model.program.objective().is_constant());
    assert!(model.variables(7).unwrap().bricks.is_empty());
}
