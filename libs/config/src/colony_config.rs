//! Colony Configuration Module
//!
//! Loads benchmark settings from an optional TOML file with `COLONY_`
//! environment overrides layered on top, and validates them before a run.

use crate::defaults;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Main benchmark configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ColonyConfig {
    /// Number of ants; must be at least 2
    pub population: usize,

    /// Schedule signals injected per driver iteration
    pub seed_batch: usize,

    /// Greetings emitted per consumed Schedule
    pub greetings_per_schedule: usize,

    /// Measurement window in seconds
    pub duration_secs: f64,

    /// Runtime worker threads (advisory for the core)
    pub workers: usize,

    /// Bounded inbox size per ant
    pub inbox_capacity: usize,

    /// Simulated processing time per greeting, in microseconds
    pub greeting_processing_micros: u64,

    /// How the run waits for in-flight traffic before collecting
    pub quiescence: QuiescenceKind,

    /// Drain timeout in seconds (drain policy)
    pub drain_timeout_secs: f64,

    /// Settle delay in seconds (sleep policy)
    pub settle_secs: f64,

    /// Deterministic seed for every random source; entropy when unset
    pub seed: Option<u64>,
}

/// Quiescence policy as written in config files
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuiescenceKind {
    /// Halt new greetings and wait for in-flight traffic to land
    #[default]
    Drain,
    /// Sleep for a fixed delay and sample while traffic continues
    Sleep,
}

/// Resolved quiescence policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuiescenceMode {
    Drain { timeout: Duration },
    Sleep { settle: Duration },
}

/// Configuration validation failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("population must be at least 2, got {0}: a lone ant has no peer to greet")]
    PopulationTooSmall(usize),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be a non-negative, in-range number of seconds, got {value}")]
    InvalidSeconds { field: &'static str, value: f64 },
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            population: defaults::POPULATION,
            seed_batch: defaults::SEED_BATCH,
            greetings_per_schedule: defaults::GREETINGS_PER_SCHEDULE,
            duration_secs: defaults::DURATION_SECS,
            workers: defaults::WORKERS,
            inbox_capacity: defaults::INBOX_CAPACITY,
            greeting_processing_micros: defaults::GREETING_PROCESSING_MICROS,
            quiescence: QuiescenceKind::default(),
            drain_timeout_secs: defaults::DRAIN_TIMEOUT_SECS,
            settle_secs: defaults::SETTLE_SECS,
            seed: None,
        }
    }
}

impl ColonyConfig {
    /// Load configuration from an optional file with environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading colony config: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        // Override with environment variables (COLONY_ prefix). Keys contain underscores,
        // so nesting uses `__`.
        builder = builder.add_source(
            Environment::with_prefix(defaults::ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        debug!(?loaded, "Colony configuration loaded");
        Ok(loaded)
    }

    /// Parse a TOML document; missing keys fall back to defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse colony TOML")
    }

    /// Check every bound the colony relies on
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.population < 2 {
            return Err(ConfigError::PopulationTooSmall(self.population));
        }

        let counts = [
            ("seed_batch", self.seed_batch),
            ("greetings_per_schedule", self.greetings_per_schedule),
            ("workers", self.workers),
            ("inbox_capacity", self.inbox_capacity),
        ];
        if let Some((field, _)) = counts.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero { field });
        }

        check_seconds("duration_secs", self.duration_secs)?;
        if self.duration_secs == 0.0 {
            return Err(ConfigError::Zero { field: "duration_secs" });
        }
        check_seconds("drain_timeout_secs", self.drain_timeout_secs)?;
        check_seconds("settle_secs", self.settle_secs)?;

        Ok(())
    }

    /// Measurement window
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }

    /// Simulated per-greeting processing time
    pub fn greeting_processing(&self) -> Duration {
        Duration::from_micros(self.greeting_processing_micros)
    }

    /// Resolve the quiescence policy with its timing
    pub fn quiescence_mode(&self) -> QuiescenceMode {
        match self.quiescence {
            QuiescenceKind::Drain => QuiescenceMode::Drain {
                timeout: Duration::from_secs_f64(self.drain_timeout_secs),
            },
            QuiescenceKind::Sleep => QuiescenceMode::Sleep {
                settle: Duration::from_secs_f64(self.settle_secs),
            },
        }
    }
}

/// Must convert to a `Duration`: finite, non-negative and in range
fn check_seconds(field: &'static str, value: f64) -> std::result::Result<(), ConfigError> {
    Duration::try_from_secs_f64(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidSeconds { field, value })
}
