//! Colony Runtime
//!
//! Builds the directory, starts one receive loop per ant, drives a
//! measurement window, waits for quiescence and collects the report.
//!
//! # Quiescence
//!
//! The self-sustaining greeting traffic never stops on its own, so two
//! policies are offered before statistics are read:
//!
//! - **Drain**: the driver is stopped and awaited, then the colony is
//!   halted (ants answer greetings with acks but open no new greetings) and
//!   the runner waits until nothing is queued or mid-handoff. Snapshots are
//!   then exact. If the timeout passes first the snapshots are taken anyway
//!   and the outcome says so.
//! - **Sleep**: a fixed settle delay with traffic still running. Sends in
//!   flight at sampling time are missing from the tally, so counters
//!   undercount and sent/received totals need not agree.
//!
//! In both cases snapshots travel through each ant's inbox, so the ant's
//! receive loop stays the only writer of its state.

use crate::ant::{Ant, AntSnapshot};
use crate::collector::{self, Report};
use crate::directory::Directory;
use crate::driver::{inject_schedule, Driver, DriverSummary};
use crate::error::{ColonyError, Result};
use crate::message::AntId;
use crate::metrics::MetricsSnapshot;
use crate::network::{AntSettings, Network};
use colony_config::{ColonyConfig, QuiescenceMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Poll interval while draining
const DRAIN_POLL: Duration = Duration::from_millis(1);

/// Per-ant generators derived from one master source. The master is only
/// touched during construction, on one task.
struct SeedSource(StdRng);

impl SeedSource {
    fn new(seed: Option<u64>) -> Self {
        Self(match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        })
    }

    fn next_rng(&mut self) -> StdRng {
        StdRng::seed_from_u64(self.0.gen())
    }
}

/// Measurement window result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunWindow {
    /// Wall clock from driver start to the stop signal
    pub elapsed: Duration,
    pub driver: DriverSummary,
}

/// How the colony got to the point where snapshots were taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Quiescence {
    /// Nothing queued or in flight
    Drained { waited: Duration },
    /// Drain gave up; counts may be short
    TimedOut {
        waited: Duration,
        unprocessed: u64,
        sends_in_flight: u64,
    },
    /// Fixed settle delay, traffic still live
    Settled { waited: Duration },
}

impl Quiescence {
    pub fn is_exact(&self) -> bool {
        matches!(self, Quiescence::Drained { .. })
    }
}

/// Everything one benchmark run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub creation_elapsed: Duration,
    pub window: RunWindow,
    pub quiescence: Quiescence,
    pub report: Report,
    pub metrics: MetricsSnapshot,
}

/// A running population of ants
pub struct Colony {
    run_id: Uuid,
    network: Arc<Network>,
    ants: Vec<JoinHandle<()>>,
    seeds: SeedSource,
    seed_batch: usize,
    creation_elapsed: Duration,
}

impl Colony {
    /// Build the directory and start every ant's receive loop. Must be
    /// called from within a tokio runtime.
    pub fn spawn(config: &ColonyConfig) -> Result<Self> {
        config.validate()?;

        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let mut seeds = SeedSource::new(config.seed);

        let (directory, inboxes) = Directory::with_inboxes(config.population, config.inbox_capacity);
        let network = Arc::new(Network::new(directory, AntSettings::from_config(config)));

        let ants: Vec<JoinHandle<()>> = inboxes
            .into_iter()
            .enumerate()
            .map(|(index, inbox)| {
                let ant = Ant::new(AntId::new(index), inbox, Arc::clone(&network), seeds.next_rng());
                tokio::spawn(ant.run())
            })
            .collect();

        let creation_elapsed = started.elapsed();
        info!(
            %run_id,
            population = config.population,
            inbox_capacity = config.inbox_capacity,
            creation_ms = creation_elapsed.as_millis(),
            "Colony spawned"
        );

        Ok(Self {
            run_id,
            network,
            ants,
            seeds,
            seed_batch: config.seed_batch,
            creation_elapsed,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn population(&self) -> usize {
        self.network.population()
    }

    /// Time taken to build the directory and start every receive loop
    pub fn creation_elapsed(&self) -> Duration {
        self.creation_elapsed
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.network.metrics().snapshot()
    }

    /// Hand a single Schedule to `target` outside of a driver window
    pub async fn inject(&self, target: AntId) -> Result<()> {
        inject_schedule(&self.network, target).await
    }

    /// Run the driver for `duration`, then stop it and wait for its last
    /// handoff. Returns the measured window.
    pub async fn run_window(&mut self, duration: Duration) -> Result<RunWindow> {
        let driver = Driver::new(Arc::clone(&self.network), self.seeds.next_rng(), self.seed_batch);
        let stop = driver.stop_handle();

        info!(run_id = %self.run_id, duration_ms = duration.as_millis(), "Measurement window open");
        let started = Instant::now();
        let task = tokio::spawn(driver.run());

        tokio::time::sleep(duration).await;
        let elapsed = started.elapsed();
        stop.stop();

        let driver = task.await.map_err(|e| ColonyError::task("driver", e))??;
        info!(
            run_id = %self.run_id,
            elapsed_ms = elapsed.as_millis(),
            schedules = driver.schedules,
            "Measurement window closed"
        );

        Ok(RunWindow { elapsed, driver })
    }

    /// Wait for the colony to settle under `mode`
    pub async fn quiesce(&self, mode: QuiescenceMode) -> Quiescence {
        match mode {
            QuiescenceMode::Drain { timeout } => self.drain(timeout).await,
            QuiescenceMode::Sleep { settle } => {
                debug!(run_id = %self.run_id, settle_ms = settle.as_millis(), "Settling with traffic live");
                tokio::time::sleep(settle).await;
                Quiescence::Settled { waited: settle }
            }
        }
    }

    async fn drain(&self, timeout: Duration) -> Quiescence {
        let metrics = self.network.metrics();
        self.network.halt();

        let started = Instant::now();
        loop {
            if metrics.is_quiescent() {
                let waited = started.elapsed();
                debug!(run_id = %self.run_id, waited_ms = waited.as_millis(), "Colony drained");
                return Quiescence::Drained { waited };
            }

            let waited = started.elapsed();
            if waited >= timeout {
                let unprocessed = metrics.unprocessed();
                let sends_in_flight = metrics.sends_in_flight();
                warn!(
                    run_id = %self.run_id,
                    unprocessed,
                    sends_in_flight,
                    "Drain timed out; report will undercount"
                );
                return Quiescence::TimedOut {
                    waited,
                    unprocessed,
                    sends_in_flight,
                };
            }

            tokio::time::sleep(DRAIN_POLL).await;
        }
    }

    /// Snapshot every ant exactly once, in id order
    pub async fn snapshots(&self) -> Result<Vec<AntSnapshot>> {
        let mut snapshots = Vec::with_capacity(self.population());
        for ant in self.network.directory().iter() {
            snapshots.push(ant.inspect().await?);
        }
        Ok(snapshots)
    }

    /// Reduce current snapshots, computing the rate over `elapsed`
    pub async fn collect(&self, elapsed: Duration) -> Result<Report> {
        let snapshots = self.snapshots().await?;
        Ok(collector::reduce(&snapshots, elapsed))
    }

    /// Stop every receive loop
    pub fn shutdown(self) {
        info!(run_id = %self.run_id, metrics = ?self.metrics(), "Colony shutting down");
        // Drop aborts the tasks
    }
}

impl Drop for Colony {
    fn drop(&mut self) {
        for ant in &self.ants {
            ant.abort();
        }
    }
}

/// Spawn a colony, run one window, settle, collect and shut down
pub async fn run(config: &ColonyConfig) -> Result<RunOutcome> {
    let mut colony = Colony::spawn(config)?;
    let window = colony.run_window(config.duration()).await?;
    let quiescence = colony.quiesce(config.quiescence_mode()).await;
    let report = colony.collect(window.elapsed).await?;

    let outcome = RunOutcome {
        run_id: colony.run_id(),
        creation_elapsed: colony.creation_elapsed(),
        window,
        quiescence,
        report,
        metrics: colony.metrics(),
    };
    colony.shutdown();
    Ok(outcome)
}
