//! # FOXHOUNDS
//!
//! Concurrent predator-prey simulation on a toroidal grid.
//!
//! ## Features
//!
//! - **Thread per occupant**: every fox and hound acts on its own OS thread
//! - **Per-cell locks**: each grid cell guards its own occupant
//! - **Deadlock-free**: multi-cell actions lock cells in sorted order and
//!   re-validate before committing
//! - **Configurable**: YAML configuration files
//! - **Reproducible placement**: seeded initial population
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use foxhounds::{Config, World};
//! use std::time::Duration;
//!
//! let mut world = World::new(Config::default()).unwrap();
//! world.populate().unwrap();
//! world.release();
//!
//! std::thread::sleep(Duration::from_secs(5));
//! println!("{}", world.stats().summary());
//! world.shutdown();
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use foxhounds::Config;
//!
//! let mut config = Config::default();
//! config.grid.width = 20;
//! config.hounds.starve_time = 1500;
//! assert!(config.validate().is_ok());
//! ```

pub mod barrier;
pub mod behavior;
pub mod config;
pub mod error;
pub mod grid;
pub mod habitat;
pub mod occupant;
pub mod protocol;
pub mod render;
pub mod stats;
pub mod world;

// Re-export main types
pub use config::Config;
pub use error::{ConfigError, Interrupted, SimError};
pub use grid::{Cell, Grid, Occupancy, Position};
pub use occupant::{Occupant, Species};
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
