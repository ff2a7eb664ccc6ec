//! City blocks and the services installed on them.

use serde::{Deserialize, Serialize};

use crate::land_use::LandUse;

/// Unique block identifier across a city.
pub type BlockId = u32;

/// A service installation on a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub category: String,
    pub capacity: f64,
}

impl ServiceInstance {
    pub fn new(category: impl Into<String>, capacity: f64) -> Self {
        Self {
            category: category.into(),
            capacity,
        }
    }
}

/// A spatial zone of the city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Site area in square meters.
    pub site_area: f64,
    pub land_use: Option<LandUse>,
    pub population: u64,
    #[serde(default)]
    pub services: Vec<ServiceInstance>,
}

impl Block {
    pub fn new(id: BlockId, site_area: f64) -> Self {
        Self {
            id,
            site_area,
            land_use: None,
            population: 0,
            services: Vec::new(),
        }
    }

    pub fn with_land_use(mut self, land_use: LandUse) -> Self {
        self.land_use = Some(land_use);
        self
    }

    pub fn with_population(mut self, population: u64) -> Self {
        self.population = population;
        self
    }

    pub fn with_service(mut self, category: impl Into<String>, capacity: f64) -> Self {
        self.services.push(ServiceInstance::new(category, capacity));
        self
    }

    /// Total installed capacity of a category on this block.
    pub fn capacity_of(&self, category: &str) -> f64 {
        self.services
            .iter()
            .filter(|s| s.category == category)
            .map(|s| s.capacity)
            .sum()
    }

    /// Area left for development given the developable share of the site.
    pub fn free_area(&self, developable_ratio: f64) -> f64 {
        self.site_area * developable_ratio
    }

    pub fn has_valid_site_area(&self) -> bool {
        self.site_area.is_finite() && self.site_area > 0.0
    }
}
