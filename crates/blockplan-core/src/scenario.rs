//! Planner-supplied priority weights over service categories.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{BlockPlanError, Result};

/// Priority weights in `[0, 1]` keyed by service category name.
///
/// Categories absent from the scenario share the remaining weight equally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scenario {
    weights: BTreeMap<String, f64>,
}

impl Scenario {
    /// Creates an empty scenario.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spreads a total weight of 1 equally over `names`.
    pub fn equal<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let weight = if names.is_empty() {
            0.0
        } else {
            1.0 / names.len() as f64
        };
        Self {
            weights: names.into_iter().map(|n| (n, weight)).collect(),
        }
    }

    pub fn with_weight(mut self, category: impl Into<String>, weight: f64) -> Self {
        self.weights.insert(category.into(), weight);
        self
    }

    pub fn weight(&self, category: &str) -> Option<f64> {
        self.weights.get(category).copied()
    }

    /// Sum of the weights of the listed categories that the scenario names.
    pub fn sum_over<'a, I>(&self, categories: I) -> f64
    where
        I: IntoIterator<Item = &'a str>,
    {
        categories
            .into_iter()
            .filter_map(|c| self.weight(c))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Checks that every weight lies in `[0, 1]` and names a known category.
    pub fn validate<F>(&self, is_known: F) -> Result<()>
    where
        F: Fn(&str) -> bool,
    {
        for (category, weight) in &self.weights {
            if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
                return Err(BlockPlanError::InvalidScenario(format!(
                    "weight {weight} for `{category}` is outside [0, 1]"
                )));
            }
            if !is_known(category) {
                return Err(BlockPlanError::InvalidScenario(format!(
                    "unknown service category `{category}`"
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, f64)> for Scenario {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}
