//! Benchmark defaults
//!
//! Default values used when neither a config file nor the environment
//! overrides a setting.

/// Number of ants in the colony
pub const POPULATION: usize = 10_000;

/// Schedule signals injected per driver iteration
pub const SEED_BATCH: usize = 10_000;

/// Greetings an ant emits when it consumes a Schedule
pub const GREETINGS_PER_SCHEDULE: usize = 1;

/// Measurement window (seconds)
pub const DURATION_SECS: f64 = 10.0;

/// Runtime worker threads
pub const WORKERS: usize = 4;

/// Bounded inbox size per ant. A full inbox blocks the sender.
pub const INBOX_CAPACITY: usize = 1024;

/// Simulated processing per greeting (microseconds)
pub const GREETING_PROCESSING_MICROS: u64 = 0;

/// Upper bound on the post-run drain (seconds)
pub const DRAIN_TIMEOUT_SECS: f64 = 5.0;

/// Fixed settle delay used by the sleep quiescence policy (seconds)
pub const SETTLE_SECS: f64 = 1.0;

/// Prefix for environment overrides, e.g. `COLONY_POPULATION=2000`
pub const ENV_PREFIX: &str = "COLONY";
