//! # Colony Configuration
//!
//! Tunables for the polite-ants benchmark: population size, seed volume,
//! run duration, worker count and the quiescence policy applied before
//! statistics are collected.
//!
//! ## Usage
//!
//! ```rust
//! use colony_config::ColonyConfig;
//!
//! let config = ColonyConfig::from_toml_str("population = 500\nduration_secs = 2.0").unwrap();
//! assert_eq!(config.population, 500);
//! assert!(config.validate().is_ok());
//! ```

pub mod colony_config;
pub mod defaults;

// Re-export commonly used types
pub use colony_config::{ColonyConfig, ConfigError, QuiescenceKind, QuiescenceMode};
