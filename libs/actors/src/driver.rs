//! Schedule Driver
//!
//! The only source of Schedule messages from outside the ant network. Picks
//! random ants and hands each a start signal, `batch` at a time, until the
//! run loop that owns the window raises the stop flag.

use crate::error::Result;
use crate::message::{AntId, Message};
use crate::network::Network;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Hand one Schedule to `target`, waiting while its inbox is full
pub async fn inject_schedule(network: &Network, target: AntId) -> Result<()> {
    network.metrics().record_schedule_injected();
    let result = network
        .directory()
        .get(target)
        .deliver(Message::schedule())
        .await;
    network.metrics().record_schedule_finished(result.is_ok());
    result
}

/// Stop flag shared between the driver and the run loop
#[derive(Debug, Clone, Default)]
pub struct DriverStop(Arc<AtomicBool>);

impl DriverStop {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What the driver did before it was stopped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverSummary {
    pub schedules: u64,
    pub completed_batches: u64,
}

/// Injection loop state
pub struct Driver {
    network: Arc<Network>,
    rng: StdRng,
    batch: usize,
    stop: DriverStop,
}

impl Driver {
    pub fn new(network: Arc<Network>, rng: StdRng, batch: usize) -> Self {
        Self {
            network,
            rng,
            batch,
            stop: DriverStop::default(),
        }
    }

    /// Flag that ends [`Driver::run`] at the next injection boundary
    pub fn stop_handle(&self) -> DriverStop {
        self.stop.clone()
    }

    /// Inject batches until stopped. A handoff in progress when the flag is
    /// raised completes first, so no schedule is left half-sent.
    pub async fn run(mut self) -> Result<DriverSummary> {
        let population = self.network.population();
        let mut summary = DriverSummary::default();

        debug!(population, batch = self.batch, "Driver started");

        'window: loop {
            for _ in 0..self.batch {
                if self.stop.is_stopped() {
                    break 'window;
                }
                let target = AntId::new(self.rng.gen_range(0..population));
                inject_schedule(&self.network, target).await?;
                summary.schedules += 1;
            }
            summary.completed_batches += 1;
            tokio::task::yield_now().await;
        }

        debug!(
            schedules = summary.schedules,
            batches = summary.completed_batches,
            "Driver stopped"
        );
        Ok(summary)
    }
}
