//! Shared test fixtures for blockplan crates.
//!
//! This crate provides small cities, scripted engines and recording doubles.
//! It does NOT depend on `blockplan-optimizer` so the optimizer can use it
//! from its own unit tests.
//!
//! - [`city`] - City builder, standard service categories, conversion scenarios
//! - [`provision`] - Provision engine that records its calls
//! - [`engine`] - MILP engine returning scripted outcomes
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! blockplan-test = { workspace = true }
//! ```
//!
//! ```ignore
//! use blockplan_test::city::{conversion_city, CityFixture};
//! use blockplan_test::provision::RecordingProvision;
//! ```

pub mod city;
pub mod engine;
pub mod provision;

pub use city::{conversion_city, standard_categories, CityFixture};
pub use engine::ScriptedEngine;
pub use provision::{RecordedCall, RecordingProvision};
