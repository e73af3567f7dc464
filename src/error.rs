//! Error types for the simulation.

use thiserror::Error;

/// Rejected start-up configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by the driver while building or running a world
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to start occupant task: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: usize, col: usize },
}

/// An occupant was woken by shutdown while sleeping or waiting at the barrier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted by shutdown")]
pub struct Interrupted;
