//! Allocation followed by provision scoring.

use std::collections::BTreeMap;

use blockplan_config::OptimizerConfig;
use blockplan_core::{Block, LandUse, ProvisionEngine, Scenario};
use blockplan_optimizer::{BlockOptimizer, GreedyProvision};
use blockplan_test::{conversion_city, CityFixture, RecordingProvision};

#[test]
fn test_new_schools_close_the_gap() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city)
        .with_config(OptimizerConfig::new().with_max_facilities(15));
    let result = optimizer
        .calculate(&BTreeMap::from([(1, LandUse::Residential)]), None)
        .unwrap();

    let provision = GreedyProvision::new(&city, &city);
    let impact = optimizer.evaluate_provision(&provision, &result, 1).unwrap();

    assert_eq!(impact.categories, vec!["schools"]);
    assert_eq!(impact.total_before, 0.0);
    assert!((impact.total_after - 1.0).abs() < 1e-9);
    assert_eq!(impact.before, vec![0.0]);
    assert!((impact.after[0] - 1.0).abs() < 1e-9);
}

#[test]
fn test_demolition_is_applied_before_scoring() {
    let city = CityFixture::new()
        .with_standard_categories()
        .with_block(
            Block::new(1, 10_000.0)
                .with_land_use(LandUse::Recreation)
                .with_service("parks", 10.0),
        )
        .with_block(
            Block::new(2, 10_000.0)
                .with_land_use(LandUse::Residential)
                .with_population(4_000),
        )
        .connect(1, 2, 5.0)
        .build();
    let optimizer = BlockOptimizer::new(&city, &city)
        .with_config(OptimizerConfig::new().with_max_facilities(20));
    let result = optimizer
        .calculate(&BTreeMap::from([(1, LandUse::Residential)]), None)
        .unwrap();

    let engine = RecordingProvision::new().with_capacity("parks", 50.0);
    let impact = optimizer.evaluate_provision(&engine, &result, 1).unwrap();

    assert_eq!(impact.categories[0], "parks");
    assert_eq!(impact.before[0], 0.5);
    assert_eq!(impact.after[0], 0.4);

    let calls = engine.calls();
    let update = calls[1].update.as_ref().unwrap();
    let row = update.get(1).unwrap();
    assert_eq!(row.capacity("parks"), Some(-10.0));
    for (category, added) in result.allocation.get(1).unwrap().capacities() {
        assert_eq!(row.capacity(category), Some(added));
    }
}

#[test]
fn test_unplanned_block_is_rejected() {
    let city = conversion_city();
    let optimizer = BlockOptimizer::new(&city, &city)
        .with_config(OptimizerConfig::new().with_max_facilities(15));
    let result = optimizer
        .calculate(&BTreeMap::from([(1, LandUse::Residential)]), None)
        .unwrap();

    let provision = GreedyProvision::new(&city, &city);
    assert!(optimizer.evaluate_provision(&provision, &result, 2).is_err());

    let (_, total) = provision
        .evaluate(&Scenario::equal(["schools"]), None, true)
        .unwrap();
    assert_eq!(total, 0.0);
}
