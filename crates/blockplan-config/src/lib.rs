//! Configuration system for blockplan.
//!
//! Load optimizer configuration from TOML or YAML files to control the
//! solver budget, facility caps and density indicators without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use blockplan_config::{BlockFailurePolicy, OptimizerConfig};
//! use std::time::Duration;
//!
//! let config = OptimizerConfig::from_toml_str(r#"
//!     max_facilities = 15
//!     on_block_failure = "skip_block"
//!
//!     [termination]
//!     seconds_spent_limit = 30
//!
//!     [land_use_indicators.mixed_use]
//!     fsi_min = 0.8
//!     fsi_max = 2.5
//! "#).unwrap();
//!
//! assert_eq!(config.time_limit(), Duration::from_secs(30));
//! assert_eq!(config.max_facilities, Some(15));
//! assert_eq!(config.on_block_failure, BlockFailurePolicy::SkipBlock);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use blockplan_config::OptimizerConfig;
//!
//! let config = OptimizerConfig::load("blockplan.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use blockplan_core::{LandUse, LandUseIndicator};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Solve time budget used when none is configured.
pub const DEFAULT_TIME_LIMIT_SECS: u64 = 60;

/// Share of a block's site area counted as free for development.
pub const DEFAULT_FREE_AREA_RATIO: f64 = 0.8;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for blockplan_core::BlockPlanError {
    fn from(err: ConfigError) -> Self {
        blockplan_core::BlockPlanError::Config(err.to_string())
    }
}

/// Main optimizer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct OptimizerConfig {
    /// Upper bound on the count of each brick per block; unbounded if unset.
    #[serde(default)]
    pub max_facilities: Option<u32>,

    /// Solver termination configuration.
    #[serde(default)]
    pub termination: Option<TerminationConfig>,

    /// Share of the site area reported as free developable area.
    #[serde(default = "default_free_area_ratio")]
    pub free_area_ratio: f64,

    /// What to do when estimation fails for a single block.
    #[serde(default)]
    pub on_block_failure: BlockFailurePolicy,

    /// Bound each block's added population by its estimated ceiling.
    #[serde(default)]
    pub cap_population_at_ceiling: bool,

    /// Density indicators overriding or extending the built-in table.
    #[serde(default)]
    pub land_use_indicators: BTreeMap<LandUse, LandUseIndicator>,
}

fn default_free_area_ratio() -> f64 {
    DEFAULT_FREE_AREA_RATIO
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_facilities: None,
            termination: None,
            free_area_ratio: DEFAULT_FREE_AREA_RATIO,
            on_block_failure: BlockFailurePolicy::default(),
            cap_population_at_ceiling: false,
            land_use_indicators: BTreeMap::new(),
        }
    }
}

impl OptimizerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML or fails
    /// validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the facility cap.
    pub fn with_max_facilities(mut self, max: u32) -> Self {
        self.max_facilities = Some(max);
        self
    }

    /// Sets the solver time limit.
    pub fn with_time_limit_seconds(mut self, seconds: u64) -> Self {
        self.termination = Some(TerminationConfig {
            seconds_spent_limit: Some(seconds),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Sets the per-block failure policy.
    pub fn with_failure_policy(mut self, policy: BlockFailurePolicy) -> Self {
        self.on_block_failure = policy;
        self
    }

    /// Adds or replaces the indicator of a land use.
    pub fn with_indicator(mut self, land_use: LandUse, indicator: LandUseIndicator) -> Self {
        self.land_use_indicators.insert(land_use, indicator);
        self
    }

    /// Enables the population ceiling constraint.
    pub fn with_population_ceiling(mut self, enabled: bool) -> Self {
        self.cap_population_at_ceiling = enabled;
        self
    }

    /// Returns the solver time limit, falling back to the default budget.
    pub fn time_limit(&self) -> Duration {
        self.termination
            .as_ref()
            .and_then(|t| t.time_limit())
            .unwrap_or(Duration::from_secs(DEFAULT_TIME_LIMIT_SECS))
    }

    /// Resolves the density indicator of a land use.
    ///
    /// Configured indicators take precedence over the built-in table.
    pub fn indicator(&self, land_use: LandUse) -> Option<LandUseIndicator> {
        self.land_use_indicators
            .get(&land_use)
            .copied()
            .or_else(|| land_use.default_indicator())
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_facilities == Some(0) {
            return Err(ConfigError::Invalid(
                "max_facilities must be at least 1".to_string(),
            ));
        }
        if !self.free_area_ratio.is_finite() || !(0.0..=1.0).contains(&self.free_area_ratio) {
            return Err(ConfigError::Invalid(format!(
                "free_area_ratio {} is outside [0, 1]",
                self.free_area_ratio
            )));
        }
        for (land_use, indicator) in &self.land_use_indicators {
            if let Some(problem) = indicator.check() {
                return Err(ConfigError::Invalid(format!(
                    "indicator for {land_use}: {problem}"
                )));
            }
        }
        Ok(())
    }
}

/// Termination configuration for the mixed-integer solve.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum seconds to spend solving.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum minutes to spend solving.
    pub minutes_spent_limit: Option<u64>,
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds =
            self.seconds_spent_limit.unwrap_or(0) + self.minutes_spent_limit.unwrap_or(0) * 60;
        if seconds > 0 {
            Some(Duration::from_secs(seconds))
        } else {
            None
        }
    }
}

/// Handling of estimation failures confined to one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockFailurePolicy {
    /// Fail the whole calculation.
    #[default]
    Abort,

    /// Drop the block from the program and report it.
    SkipBlock,
}
