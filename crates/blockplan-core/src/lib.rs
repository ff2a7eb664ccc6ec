//! blockplan Core - Domain model for land-use redevelopment planning
//!
//! This crate provides the shared vocabulary of blockplan:
//! - Blocks, service categories and their buildable bricks
//! - Land-use categories and their density indicators
//! - Scenarios (priority weights over service categories)
//! - Update tables (capacity/population deltas per block)
//! - Traits for the external city model, accessibility and provision engines
//! - An in-memory city backed by a travel-cost matrix

pub mod block;
pub mod city;
pub mod error;
pub mod land_use;
pub mod memory;
pub mod provision;
pub mod scenario;
pub mod service;
pub mod status;
pub mod update;

pub use block::{Block, BlockId, ServiceInstance};
pub use city::{AccessibilityProvider, AccessibilityRow, BlockRecord, BlocksTable, CityModel};
pub use error::{BlockPlanError, Result};
pub use land_use::{LandUse, LandUseIndicator};
pub use memory::InMemoryCity;
pub use provision::{BlockProvision, ProvisionColumn, ProvisionEngine, ProvisionTable};
pub use scenario::Scenario;
pub use service::{Brick, ServiceCategory};
pub use status::SolveStatus;
pub use update::{UpdateRow, UpdateTable, POPULATION_COLUMN};
