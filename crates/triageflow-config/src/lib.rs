//! Configuration system for triageflow.
//!
//! Load engine configuration from TOML or YAML files to control knapsack
//! bounds, route capacity policy and verification without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use triageflow_config::{EngineConfig, RouteCapacityPolicy};
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     environment_mode = "full_assert"
//!
//!     [knapsack]
//!     max_capacity = 5000
//!
//!     [transport]
//!     route_capacity = "send_limit"
//! "#).unwrap();
//!
//! assert_eq!(config.knapsack.max_capacity, 5000);
//! assert_eq!(config.knapsack.default_kit_capacity, 100);
//! assert_eq!(config.transport.route_capacity, RouteCapacityPolicy::SendLimit);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use triageflow_config::EngineConfig;
//!
//! let config = EngineConfig::load("engine.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upper bound on a single knapsack capacity.
pub const DEFAULT_MAX_CAPACITY: i64 = 100_000;

/// Capacity used by the kit optimization when none is given.
pub const DEFAULT_KIT_CAPACITY: i64 = 100;

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

/// Main engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Environment mode affecting verification overhead.
    #[serde(default)]
    pub environment_mode: EnvironmentMode,

    #[serde(default)]
    pub knapsack: KnapsackConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    /// Compute results without committing them.
    #[serde(default)]
    pub dry_run: bool,
}

impl EngineConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist, contains invalid TOML, or fails
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

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knapsack.max_capacity <= 0 {
            return Err(ConfigError::Invalid(format!(
                "knapsack.max_capacity must be positive, got {}",
                self.knapsack.max_capacity
            )));
        }
        if self.knapsack.default_kit_capacity < 0 {
            return Err(ConfigError::Invalid(format!(
                "knapsack.default_kit_capacity must not be negative, got {}",
                self.knapsack.default_kit_capacity
            )));
        }
        if self.knapsack.default_kit_capacity > self.knapsack.max_capacity {
            return Err(ConfigError::Invalid(format!(
                "knapsack.default_kit_capacity {} exceeds max_capacity {}",
                self.knapsack.default_kit_capacity, self.knapsack.max_capacity
            )));
        }
        Ok(())
    }

    /// Sets the knapsack capacity bound.
    pub fn with_max_capacity(mut self, max_capacity: i64) -> Self {
        self.knapsack.max_capacity = max_capacity;
        self
    }

    /// Sets the environment mode.
    pub fn with_environment_mode(mut self, mode: EnvironmentMode) -> Self {
        self.environment_mode = mode;
        self
    }

    /// Enables or disables dry runs.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns true if every solve should be verified.
    pub fn is_full_assert(&self) -> bool {
        self.environment_mode == EnvironmentMode::FullAssert
    }
}

/// Environment mode affecting engine behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Deterministic results, no extra checks.
    #[default]
    Reproducible,

    /// Verifies conservation, capacity and min cut after every solve.
    FullAssert,
}

/// Knapsack bounds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct KnapsackConfig {
    /// Largest capacity a single knapsack run accepts.
    pub max_capacity: i64,

    /// Capacity of the kit optimization when the caller gives none.
    pub default_kit_capacity: i64,
}

impl Default for KnapsackConfig {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            default_kit_capacity: DEFAULT_KIT_CAPACITY,
        }
    }
}

/// Transport flow settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct TransportConfig {
    pub route_capacity: RouteCapacityPolicy,
}

/// Which stored figure bounds a center-to-zone route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteCapacityPolicy {
    /// The amount recorded by a previous run if positive, else the send limit.
    #[default]
    PreferSent,

    /// Always the configured send limit.
    SendLimit,
}

/// Route network settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct NetworkConfig {
    /// Adds every link in both directions.
    pub bidirectional: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bidirectional: true,
        }
    }
}
