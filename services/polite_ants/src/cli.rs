//! Command line arguments and their mapping onto [`ColonyConfig`]

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colony_config::{ColonyConfig, QuiescenceKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "polite-ants")]
#[command(about = "Actor-network benchmark: ants greeting each other at random")]
#[command(version)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of ants
    #[arg(short = 'n', long)]
    pub population: Option<usize>,

    /// Schedule signals injected per driver iteration
    #[arg(long)]
    pub seed_batch: Option<usize>,

    /// Greetings emitted per consumed schedule
    #[arg(long)]
    pub greetings_per_schedule: Option<usize>,

    /// Measurement window in seconds
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Worker thread counts; one full run per entry (e.g. 1,2,3,4)
    #[arg(short, long, value_delimiter = ',')]
    pub workers: Vec<usize>,

    /// Bounded inbox size per ant
    #[arg(long)]
    pub inbox_capacity: Option<usize>,

    /// Simulated processing per greeting, in microseconds
    #[arg(long)]
    pub greeting_processing_micros: Option<u64>,

    /// How to settle before collecting statistics
    #[arg(long, value_enum)]
    pub quiescence: Option<QuiescenceArg>,

    /// Deterministic seed for every random source
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    pub json_logs: bool,

    /// Print reports as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Also write the combined output to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuiescenceArg {
    /// Halt new greetings and wait for in-flight traffic
    Drain,
    /// Fixed settle delay with traffic still running
    Sleep,
}

impl From<QuiescenceArg> for QuiescenceKind {
    fn from(arg: QuiescenceArg) -> Self {
        match arg {
            QuiescenceArg::Drain => QuiescenceKind::Drain,
            QuiescenceArg::Sleep => QuiescenceKind::Sleep,
        }
    }
}

impl Args {
    /// File and environment first, then command line flags on top
    pub fn resolve_config(&self) -> Result<ColonyConfig> {
        let mut config = ColonyConfig::load(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut ColonyConfig) {
        if let Some(population) = self.population {
            config.population = population;
        }
        if let Some(seed_batch) = self.seed_batch {
            config.seed_batch = seed_batch;
        }
        if let Some(greetings) = self.greetings_per_schedule {
            config.greetings_per_schedule = greetings;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(&workers) = self.workers.first() {
            config.workers = workers;
        }
        if let Some(capacity) = self.inbox_capacity {
            config.inbox_capacity = capacity;
        }
        if let Some(micros) = self.greeting_processing_micros {
            config.greeting_processing_micros = micros;
        }
        if let Some(quiescence) = self.quiescence {
            config.quiescence = quiescence.into();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }

    /// Worker counts to sweep; the configured count when none were given
    pub fn worker_sweep(&self, config: &ColonyConfig) -> Vec<usize> {
        if self.workers.is_empty() {
            vec![config.workers]
        } else {
            self.workers.clone()
        }
    }
}
