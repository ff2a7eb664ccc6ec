//! Local and city-wide demand/capacity estimation for a converting block.

use std::collections::{BTreeMap, HashMap};

use blockplan_core::{
    AccessibilityProvider, AccessibilityRow, BlockId, BlocksTable, Result, ServiceCategory,
};
use serde::{Deserialize, Serialize};

/// Demand and capacity of one service within a block's catchment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceBalance {
    pub demand_local: f64,
    pub capacity_local: f64,
}

impl ServiceBalance {
    /// Unmet local demand; negative when capacity is to spare.
    pub fn gap(&self) -> f64 {
        self.demand_local - self.capacity_local
    }
}

/// Constants derived for one block before the program is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationConstants {
    pub services: BTreeMap<String, ServiceBalance>,
    /// City-wide `capacity - demand` per service, in estimation order.
    pub global_margins: Vec<(String, f64)>,
    /// Largest population the scarcest service could absorb city-wide.
    pub population_ceiling: f64,
    /// Service that set the ceiling.
    pub bottleneck: Option<String>,
}

impl EstimationConstants {
    pub fn service(&self, category: &str) -> ServiceBalance {
        self.services.get(category).copied().unwrap_or_default()
    }
}

/// Accessibility rows per focal block, kept for one calculation.
#[derive(Debug, Default)]
pub struct CatchmentCache {
    rows: HashMap<BlockId, Vec<AccessibilityRow>>,
}

impl CatchmentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows around `block`, querying the provider on first use.
    pub fn rows<A>(&mut self, provider: &A, block: BlockId) -> Result<&[AccessibilityRow]>
    where
        A: AccessibilityProvider + ?Sized,
    {
        if !self.rows.contains_key(&block) {
            let rows = provider.accessibility(block)?;
            self.rows.insert(block, rows);
        }
        Ok(self.rows.get(&block).map(Vec::as_slice).unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Estimates local balances and the population ceiling for `block`.
///
/// `categories` must already be in estimation order. The block's own
/// population counts as zero and its own installed capacity is excluded,
/// both locally and city-wide.
pub fn estimate(
    block: BlockId,
    categories: &[&ServiceCategory],
    table: &BlocksTable,
    catchment: &[AccessibilityRow],
) -> EstimationConstants {
    let population = |id: BlockId| {
        if id == block {
            0.0
        } else {
            table.population(id)
        }
    };

    let mut services = BTreeMap::new();
    let mut global_margins = Vec::with_capacity(categories.len());
    let mut scarcest: Option<(&ServiceCategory, f64)> = None;

    for category in categories {
        let own_capacity = table.capacity(block, &category.name);

        let mut demand_local = 0.0;
        let mut capacity_local = 0.0;
        for row in catchment.iter().filter(|r| r.within(category.accessibility)) {
            demand_local += category.demand_for(population(row.block));
            capacity_local += table.capacity(row.block, &category.name);
        }
        services.insert(
            category.name.clone(),
            ServiceBalance {
                demand_local,
                capacity_local: capacity_local - own_capacity,
            },
        );

        let mut demand_global = 0.0;
        let mut capacity_global = 0.0;
        for (id, record) in table.iter() {
            demand_global += category.demand_for(population(id));
            capacity_global += record.capacity(&category.name);
        }
        let margin = capacity_global - own_capacity - demand_global;
        global_margins.push((category.name.clone(), margin));

        if scarcest.map_or(true, |(_, least)| margin < least) {
            scarcest = Some((category, margin));
        }
    }

    let (population_ceiling, bottleneck) = match scarcest {
        Some((category, margin)) => (
            population_ceiling(margin, category.demand_rate),
            Some(category.name.clone()),
        ),
        None => (f64::INFINITY, None),
    };

    EstimationConstants {
        services,
        global_margins,
        population_ceiling,
        bottleneck,
    }
}

/// Residents a spare capacity `margin` can absorb at `rate` per 1000.
pub fn population_ceiling(margin: f64, rate: f64) -> f64 {
    if rate == 0.0 {
        return if margin >= 0.0 { f64::INFINITY } else { 0.0 };
    }
    (margin / rate * 1000.0).max(0.0)
}
