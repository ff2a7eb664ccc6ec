use std::collections::{BTreeMap, HashMap};

use blockplan_core::{
    AccessibilityProvider, AccessibilityRow, BlockId, BlockProvision, CityModel, ProvisionColumn,
    ProvisionEngine, ProvisionTable, Result, Scenario, ServiceCategory, UpdateTable,
};

/// Reference provision engine assigning demand to the nearest free capacity.
///
/// Demand blocks are served in id order. Each draws from blocks with spare
/// capacity in ascending travel cost, ties broken by id; supply reached
/// within the service's threshold counts as served within.
pub struct GreedyProvision<'a, C: ?Sized, A: ?Sized> {
    city: &'a C,
    accessibility: &'a A,
}

impl<'a, C, A> GreedyProvision<'a, C, A>
where
    C: CityModel + ?Sized,
    A: AccessibilityProvider + ?Sized,
{
    pub fn new(city: &'a C, accessibility: &'a A) -> Self {
        Self {
            city,
            accessibility,
        }
    }

    /// Provision of one service with `update` applied.
    pub fn column(
        &self,
        category: &ServiceCategory,
        update: Option<&UpdateTable>,
        self_supply: bool,
    ) -> Result<ProvisionColumn> {
        let delta_population = |id| update.map_or(0.0, |u| u.population_delta(id));
        let delta_capacity = |id| update.map_or(0.0, |u| u.capacity_delta(id, &category.name));

        let mut rows: BTreeMap<BlockId, BlockProvision> = BTreeMap::new();
        let mut demand_left: BTreeMap<BlockId, f64> = BTreeMap::new();
        let mut capacity_left: BTreeMap<BlockId, f64> = BTreeMap::new();

        for block in self.city.blocks() {
            let demand = category.demand_for(block.population as f64 + delta_population(block.id));
            let capacity = (block.capacity_of(&category.name) + delta_capacity(block.id)).max(0.0);
            let mut row = BlockProvision {
                block: block.id,
                demand,
                capacity,
                ..BlockProvision::default()
            };
            let own = if self_supply { demand.min(capacity) } else { 0.0 };
            row.demand_within = own;
            demand_left.insert(block.id, demand - own);
            capacity_left.insert(block.id, capacity - own);
            rows.insert(block.id, row);
        }

        let mut catchments: HashMap<BlockId, Vec<AccessibilityRow>> = HashMap::new();
        let demand_blocks: Vec<BlockId> = demand_left
            .iter()
            .filter(|(_, d)| **d > 0.0)
            .map(|(id, _)| *id)
            .collect();

        for id in demand_blocks {
            if capacity_left.values().all(|c| *c <= 0.0) {
                break;
            }
            if !catchments.contains_key(&id) {
                catchments.insert(id, self.accessibility.accessibility(id)?);
            }
            let mut suppliers: Vec<(f64, BlockId)> = catchments
                .get(&id)
                .into_iter()
                .flatten()
                .filter(|r| r.accessibility_to.is_finite())
                .filter(|r| capacity_left.get(&r.block).is_some_and(|c| *c > 0.0))
                .map(|r| (r.accessibility_to, r.block))
                .collect();
            suppliers.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let mut wanted = demand_left.get(&id).copied().unwrap_or(0.0);
            for (cost, supplier) in suppliers {
                if wanted <= 0.0 {
                    break;
                }
                let Some(available) = capacity_left.get_mut(&supplier) else {
                    continue;
                };
                let taken = wanted.min(*available);
                *available -= taken;
                wanted -= taken;
                if let Some(row) = rows.get_mut(&id) {
                    if cost <= category.accessibility {
                        row.demand_within += taken;
                    } else {
                        row.demand_without += taken;
                    }
                }
            }
            demand_left.insert(id, wanted);
        }

        Ok(ProvisionColumn {
            category: category.name.clone(),
            rows: rows.into_values().collect(),
        })
    }
}

impl<C, A> ProvisionEngine for GreedyProvision<'_, C, A>
where
    C: CityModel + ?Sized,
    A: AccessibilityProvider + ?Sized,
{
    fn evaluate(
        &self,
        weights: &Scenario,
        update: Option<&UpdateTable>,
        self_supply: bool,
    ) -> Result<(ProvisionTable, f64)> {
        let mut table = ProvisionTable::new();
        let mut total = 0.0;
        for (name, weight) in weights.iter() {
            let category = self.city.service_category(name)?;
            let column = self.column(category, update, self_supply)?;
            total += weight * self.total_provision(&column);
            table.insert(column);
        }
        Ok((table, total))
    }
}
