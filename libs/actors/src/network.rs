//! Shared colony state
//!
//! Everything an ant, a send task or the driver needs to reach the rest of
//! the colony. Read-only apart from the atomics.

use crate::directory::Directory;
use crate::metrics::ColonyMetrics;
use colony_config::ColonyConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Per-ant behavior knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AntSettings {
    /// Greetings emitted per consumed Schedule
    pub greetings_per_schedule: usize,
    /// Simulated work before a greeting is answered
    pub greeting_processing: Duration,
}

impl AntSettings {
    pub fn from_config(config: &ColonyConfig) -> Self {
        Self {
            greetings_per_schedule: config.greetings_per_schedule,
            greeting_processing: config.greeting_processing(),
        }
    }
}

impl Default for AntSettings {
    fn default() -> Self {
        Self {
            greetings_per_schedule: 1,
            greeting_processing: Duration::ZERO,
        }
    }
}

/// State shared by every task in one colony
#[derive(Debug)]
pub struct Network {
    directory: Directory,
    metrics: ColonyMetrics,
    settings: AntSettings,

    /// Once set, ants stop opening new greetings; acks still flow
    halted: AtomicBool,
}

impl Network {
    pub fn new(directory: Directory, settings: AntSettings) -> Self {
        Self {
            directory,
            metrics: ColonyMetrics::default(),
            settings,
            halted: AtomicBool::new(false),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn metrics(&self) -> &ColonyMetrics {
        &self.metrics
    }

    pub fn settings(&self) -> &AntSettings {
        &self.settings
    }

    pub fn population(&self) -> usize {
        self.directory.len()
    }

    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }
}
