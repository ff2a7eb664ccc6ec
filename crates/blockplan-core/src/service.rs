//! Service categories and their buildable facility options.

use serde::{Deserialize, Serialize};

use crate::land_use::LandUse;

/// A discrete buildable unit for one service category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Capacity provided by one unit.
    pub capacity: f64,
    /// Area consumed by one unit, in square meters.
    pub area: f64,
    /// Whether the unit is integrated into a building rather than standalone.
    #[serde(default)]
    pub is_integrated: bool,
}

impl Brick {
    pub fn new(capacity: f64, area: f64) -> Self {
        Self {
            capacity,
            area,
            is_integrated: false,
        }
    }

    pub fn integrated(mut self) -> Self {
        self.is_integrated = true;
        self
    }
}

/// A city service such as schools or pharmacies.
///
/// `demand_rate` is expressed per 1000 residents and `accessibility` is the
/// maximum travel cost under which a block counts as local for the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCategory {
    pub name: String,
    pub demand_rate: f64,
    pub accessibility: f64,
    #[serde(default)]
    pub land_uses: Vec<LandUse>,
    #[serde(default)]
    pub bricks: Vec<Brick>,
}

impl ServiceCategory {
    pub fn new(name: impl Into<String>, demand_rate: f64, accessibility: f64) -> Self {
        Self {
            name: name.into(),
            demand_rate,
            accessibility,
            land_uses: Vec::new(),
            bricks: Vec::new(),
        }
    }

    /// Ties the category to a land use.
    pub fn with_land_use(mut self, land_use: LandUse) -> Self {
        if !self.land_uses.contains(&land_use) {
            self.land_uses.push(land_use);
        }
        self
    }

    /// Adds a buildable option to the catalog.
    pub fn with_brick(mut self, brick: Brick) -> Self {
        self.bricks.push(brick);
        self
    }

    /// Number of residents in need of this service among `population`.
    ///
    /// Rounded up; negative populations count as empty.
    pub fn demand_for(&self, population: f64) -> f64 {
        (population.max(0.0) / 1000.0 * self.demand_rate).ceil()
    }

    /// Demand generated by an added population, without rounding.
    ///
    /// This is the linear form used inside the allocation program.
    pub fn marginal_demand(&self, population: f64) -> f64 {
        population * self.demand_rate / 1000.0
    }

    pub fn is_tied_to(&self, land_use: LandUse) -> bool {
        self.land_uses.contains(&land_use)
    }

    pub fn has_bricks(&self) -> bool {
        !self.bricks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_rounds_up() {
        let schools = ServiceCategory::new("schools", 120.0, 15.0);
        assert_eq!(schools.demand_for(1000.0), 120.0);
        assert_eq!(schools.demand_for(1001.0), 121.0);
        assert_eq!(schools.demand_for(0.0), 0.0);
        assert_eq!(schools.demand_for(-50.0), 0.0);
    }

    #[test]
    fn test_marginal_demand_is_linear() {
        let kindergartens = ServiceCategory::new("kindergartens", 61.0, 10.0);
        assert!((kindergartens.marginal_demand(500.0) - 30.5).abs() < 1e-9);
    }

    #[test]
    fn test_builder() {
        let category = ServiceCategory::new("pharmacies", 50.0, 10.0)
            .with_land_use(LandUse::Residential)
            .with_land_use(LandUse::Residential)
            .with_land_use(LandUse::Business)
            .with_brick(Brick::new(25.0, 150.0))
            .with_brick(Brick::new(50.0, 250.0).integrated());

        assert_eq!(category.land_uses.len(), 2);
        assert!(category.is_tied_to(LandUse::Business));
        assert!(!category.is_tied_to(LandUse::Transport));
        assert_eq!(category.bricks.len(), 2);
        assert!(category.bricks[1].is_integrated);
    }
}
