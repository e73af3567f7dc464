//! Configuration system for the fox and hound simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest accepted grid dimension (every occupant owns a thread)
pub const MAX_DIMENSION: usize = 512;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub hounds: HoundConfig,
    #[serde(default)]
    pub seeding: SeedingConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Grid dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
}

/// Hound configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoundConfig {
    /// Hunger units (milliseconds of sleep) a hound survives without eating
    pub starve_time: i64,
}

/// Initial placement probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedingConfig {
    /// Chance that a cell starts with a fox (drawn first)
    pub fox_probability: f64,
    /// Chance that a cell without a fox starts with a hound
    pub hound_probability: f64,
    /// Fixed seed for reproducible placement
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Occupant reaction latency and display cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Minimum sleep between two actions of one occupant
    pub nap_base_ms: u64,
    /// Uniform random extra sleep added to the base
    pub nap_jitter_ms: u64,
    /// Milliseconds between two text renders
    pub render_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Milliseconds between stats summaries
    pub stats_interval_ms: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
        }
    }
}

impl Default for HoundConfig {
    fn default() -> Self {
        Self { starve_time: 3000 }
    }
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            fox_probability: 0.5,
            hound_probability: 0.15,
            seed: None,
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            nap_base_ms: 500,
            nap_jitter_ms: 750,
            render_interval_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval_ms: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_dimension("grid.width", self.grid.width)?;
        check_dimension("grid.height", self.grid.height)?;
        if self.hounds.starve_time <= 0 {
            return Err(ConfigError::invalid(
                "hounds.starve_time",
                format!("must be > 0, got {}", self.hounds.starve_time),
            ));
        }
        check_probability("seeding.fox_probability", self.seeding.fox_probability)?;
        check_probability("seeding.hound_probability", self.seeding.hound_probability)?;
        if self.timing.nap_base_ms == 0 {
            return Err(ConfigError::invalid("timing.nap_base_ms", "must be > 0"));
        }
        if self.timing.render_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "timing.render_interval_ms",
                "must be > 0",
            ));
        }
        if self.logging.stats_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "logging.stats_interval_ms",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

fn check_dimension(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 || value > MAX_DIMENSION {
        return Err(ConfigError::invalid(
            field,
            format!("must be between 1 and {}, got {}", MAX_DIMENSION, value),
        ));
    }
    Ok(())
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("must be within [0, 1], got {}", value),
        ));
    }
    Ok(())
}
