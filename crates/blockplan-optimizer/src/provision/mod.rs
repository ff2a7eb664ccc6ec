//! Before/after provision of a converted block.

mod greedy;

pub use greedy::GreedyProvision;

use std::collections::BTreeSet;

use blockplan_core::{
    BlockId, CityModel, LandUse, ProvisionEngine, ProvisionTable, Result, Scenario, UpdateRow,
    UpdateTable,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::demolition::demolition_row;

/// Provision scores before and after converting one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionImpact {
    pub block: BlockId,
    pub total_before: f64,
    pub total_after: f64,
    /// Scored services: original land use first, then new ones.
    pub categories: Vec<String>,
    pub before: Vec<f64>,
    pub after: Vec<f64>,
}

impl ProvisionImpact {
    pub fn total_delta(&self) -> f64 {
        self.total_after - self.total_before
    }

    /// Per-service change, aligned with `categories`.
    pub fn deltas(&self) -> impl Iterator<Item = (&str, f64)> {
        self.categories
            .iter()
            .zip(self.before.iter().zip(&self.after))
            .map(|(name, (before, after))| (name.as_str(), after - before))
    }
}

/// Scores the effect of clearing `block` and applying its allocation row.
pub fn evaluate_provision_impact<C, P>(
    city: &C,
    engine: &P,
    block: BlockId,
    target: LandUse,
    allocation: Option<&UpdateRow>,
) -> Result<ProvisionImpact>
where
    C: CityModel + ?Sized,
    P: ProvisionEngine + ?Sized,
{
    let current = city.block(block)?;

    let mut categories: Vec<String> = Vec::new();
    let mut seen = BTreeSet::new();
    let original = city.land_use_service_categories(current.land_use);
    let candidate = city.land_use_service_categories(Some(target));
    for category in original.into_iter().chain(candidate) {
        if seen.insert(category.name.as_str()) {
            categories.push(category.name.clone());
        }
    }
    let scenario = Scenario::equal(categories.iter().cloned());

    let (before_table, total_before) = engine.evaluate(&scenario, None, true)?;

    let net = allocation
        .cloned()
        .unwrap_or_default()
        .merged(&demolition_row(current, true));
    let mut update = UpdateTable::new();
    update.insert(block, net);
    let (after_table, total_after) = engine.evaluate(&scenario, Some(&update), true)?;

    let before = column_totals(engine, &before_table, &categories);
    let after = column_totals(engine, &after_table, &categories);

    info!(
        event = "provision_evaluated",
        block,
        total_before,
        total_after,
        category_count = categories.len(),
    );

    Ok(ProvisionImpact {
        block,
        total_before,
        total_after,
        categories,
        before,
        after,
    })
}

fn column_totals<P>(engine: &P, table: &ProvisionTable, categories: &[String]) -> Vec<f64>
where
    P: ProvisionEngine + ?Sized,
{
    categories
        .iter()
        .map(|name| {
            table
                .column(name)
                .map(|column| engine.total_provision(column))
                .unwrap_or(0.0)
        })
        .collect()
}
