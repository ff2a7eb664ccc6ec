//! Flattened brick options per block.

use blockplan_core::{BlockId, ServiceCategory};
use serde::{Deserialize, Serialize};

/// One buildable option, tagged with its service category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickRow {
    pub category: String,
    pub capacity: f64,
    pub area: f64,
    pub is_integrated: bool,
}

/// Brick rows for a block together with the categories that offered none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockCatalog {
    pub rows: Vec<BrickRow>,
    pub missing: Vec<String>,
}

impl BlockCatalog {
    /// Enumerates every brick of every category, in category order.
    pub fn for_categories(categories: &[&ServiceCategory]) -> Self {
        let mut catalog = Self::default();
        for category in categories {
            if !category.has_bricks() {
                catalog.missing.push(category.name.clone());
                continue;
            }
            catalog
                .rows
                .extend(category.bricks.iter().map(|brick| BrickRow {
                    category: category.name.clone(),
                    capacity: brick.capacity,
                    area: brick.area,
                    is_integrated: brick.is_integrated,
                }));
        }
        catalog
    }

    /// Row indices belonging to `category`.
    pub fn indices_of<'a>(&'a self, category: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.category == category)
            .map(|(idx, _)| idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Non-fatal findings gathered while preparing a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalculationWarning {
    /// A candidate service has nothing to build, so its deficit stays open.
    MissingBrickCatalog { block: BlockId, category: String },
}

impl std::fmt::Display for CalculationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalculationWarning::MissingBrickCatalog { block, category } => {
                write!(f, "block {block}: no bricks for service `{category}`")
            }
        }
    }
}
