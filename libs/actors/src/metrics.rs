//! Colony Metrics
//!
//! Process-wide traffic counters. These are observability plus the drain
//! barrier's gauges: the report itself is reduced from ant snapshots, never
//! from these.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Colony-wide counters shared by ants, send tasks and the driver
#[derive(Debug, Default)]
pub struct ColonyMetrics {
    pub schedules_injected: AtomicU64,
    pub sends_spawned: AtomicU64,
    pub messages_delivered: AtomicU64,
    pub messages_processed: AtomicU64,
    pub undelivered: AtomicU64,

    /// Messages created but not yet processed by their target
    unprocessed: AtomicU64,
    /// Send tasks that have not finished
    sends_in_flight: AtomicU64,
}

impl ColonyMetrics {
    /// A send task is about to be spawned. Must be called before the
    /// processing of the message that caused it is recorded.
    pub fn record_send_spawned(&self) {
        self.sends_spawned.fetch_add(1, Ordering::Relaxed);
        self.unprocessed.fetch_add(1, Ordering::SeqCst);
        self.sends_in_flight.fetch_add(1, Ordering::SeqCst);
    }

    /// A send task finished its handoff, after any sender-side counters
    pub fn record_send_finished(&self, delivered: bool) {
        if delivered {
            self.messages_delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
            self.unprocessed.fetch_sub(1, Ordering::SeqCst);
        }
        self.sends_in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    /// The driver is about to hand off a schedule
    pub fn record_schedule_injected(&self) {
        self.schedules_injected.fetch_add(1, Ordering::Relaxed);
        self.unprocessed.fetch_add(1, Ordering::SeqCst);
    }

    /// Outcome of a driver handoff
    pub fn record_schedule_finished(&self, delivered: bool) {
        if delivered {
            self.messages_delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
            self.unprocessed.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// An ant finished processing a delivered message
    pub fn record_processed(&self) {
        self.messages_processed.fetch_add(1, Ordering::Relaxed);
        self.unprocessed.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn unprocessed(&self) -> u64 {
        self.unprocessed.load(Ordering::SeqCst)
    }

    pub fn sends_in_flight(&self) -> u64 {
        self.sends_in_flight.load(Ordering::SeqCst)
    }

    /// True once nothing is queued, processing, or mid-handoff.
    ///
    /// `unprocessed` is read first: once it is zero no new send can start
    /// (sends only start while a message is being processed), so a zero
    /// `sends_in_flight` read afterwards is final.
    pub fn is_quiescent(&self) -> bool {
        self.unprocessed() == 0 && self.sends_in_flight() == 0
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            schedules_injected: self.schedules_injected.load(Ordering::Relaxed),
            sends_spawned: self.sends_spawned.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            messages_processed: self.messages_processed.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
            unprocessed: self.unprocessed(),
            sends_in_flight: self.sends_in_flight(),
        }
    }
}

/// Point-in-time copy of [`ColonyMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub schedules_injected: u64,
    pub sends_spawned: u64,
    pub messages_delivered: u64,
    pub messages_processed: u64,
    pub undelivered: u64,
    pub unprocessed: u64,
    pub sends_in_flight: u64,
}
