//! Land-use categories and their density indicators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Land-use category of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUse {
    Residential,
    MixedUse,
    Business,
    Recreation,
    Special,
    Industrial,
    Agriculture,
    Transport,
}

impl LandUse {
    pub const ALL: [LandUse; 8] = [
        LandUse::Residential,
        LandUse::MixedUse,
        LandUse::Business,
        LandUse::Recreation,
        LandUse::Special,
        LandUse::Industrial,
        LandUse::Agriculture,
        LandUse::Transport,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LandUse::Residential => "Residential",
            LandUse::MixedUse => "Mixed-use",
            LandUse::Business => "Business",
            LandUse::Recreation => "Recreation",
            LandUse::Special => "Special",
            LandUse::Industrial => "Industrial",
            LandUse::Agriculture => "Agriculture",
            LandUse::Transport => "Transport",
        }
    }

    /// Built-in density indicator, if one is defined for this land use.
    ///
    /// Mixed-use has no built-in bounds; they must come from configuration.
    pub fn default_indicator(self) -> Option<LandUseIndicator> {
        let indicator = match self {
            LandUse::Residential => LandUseIndicator::new(0.5, 3.0, 0.2, 0.8),
            LandUse::Business => LandUseIndicator::new(1.0, 3.0, 0.0, 0.8),
            LandUse::Recreation => LandUseIndicator::new(0.05, 0.2, 0.0, 0.3),
            LandUse::Special => LandUseIndicator::new(0.05, 0.2, 0.05, 0.15),
            LandUse::Industrial => LandUseIndicator::new(0.3, 1.5, 0.2, 0.8),
            LandUse::Agriculture => LandUseIndicator::new(0.1, 0.2, 0.0, 0.6),
            LandUse::Transport => LandUseIndicator::new(0.2, 1.0, 0.0, 0.8),
            LandUse::MixedUse => return None,
        };
        Some(indicator)
    }
}

impl fmt::Display for LandUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a land-use label is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandUseParseError(pub String);

impl fmt::Display for LandUseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown land use `{}`", self.0)
    }
}

impl std::error::Error for LandUseParseError {}

impl FromStr for LandUse {
    type Err = LandUseParseError;

    /// Accepts both display labels ("Mixed-use") and snake_case ("mixed_use").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "residential" => Ok(LandUse::Residential),
            "mixed_use" => Ok(LandUse::MixedUse),
            "business" => Ok(LandUse::Business),
            "recreation" => Ok(LandUse::Recreation),
            "special" => Ok(LandUse::Special),
            "industrial" => Ok(LandUse::Industrial),
            "agriculture" => Ok(LandUse::Agriculture),
            "transport" => Ok(LandUse::Transport),
            _ => Err(LandUseParseError(s.to_string())),
        }
    }
}

/// Density bounds for one land-use category.
///
/// Floor-space index (FSI) is built floor area over site area. Site coverage
/// is footprint over site area; it is carried for reporting but does not
/// constrain the allocation program.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LandUseIndicator {
    pub fsi_min: f64,
    pub fsi_max: f64,
    #[serde(default)]
    pub site_coverage_min: f64,
    #[serde(default = "full_coverage")]
    pub site_coverage_max: f64,
}

fn full_coverage() -> f64 {
    1.0
}

impl LandUseIndicator {
    pub fn new(fsi_min: f64, fsi_max: f64, site_coverage_min: f64, site_coverage_max: f64) -> Self {
        Self {
            fsi_min,
            fsi_max,
            site_coverage_min,
            site_coverage_max,
        }
    }

    /// Minimum built area a site of `site_area` must reach.
    pub fn min_built_area(&self, site_area: f64) -> f64 {
        self.fsi_min * site_area
    }

    /// Maximum built area a site of `site_area` may carry.
    pub fn max_built_area(&self, site_area: f64) -> f64 {
        self.fsi_max * site_area
    }

    /// Describes the first inconsistency in the bounds, if any.
    pub fn check(&self) -> Option<String> {
        let values = [
            self.fsi_min,
            self.fsi_max,
            self.site_coverage_min,
            self.site_coverage_max,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Some("bounds must be finite and non-negative".to_string());
        }
        if self.fsi_min > self.fsi_max {
            return Some(format!(
                "fsi_min {} exceeds fsi_max {}",
                self.fsi_min, self.fsi_max
            ));
        }
        if self.site_coverage_min > self.site_coverage_max {
            return Some(format!(
                "site_coverage_min {} exceeds site_coverage_max {}",
                self.site_coverage_min, self.site_coverage_max
            ));
        }
        None
    }
}
