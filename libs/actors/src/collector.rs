//! Statistics Collector
//!
//! Folds ant snapshots into the run [`Report`]. Pure: it never touches a
//! live ant, only the copies the colony took through each inbox.
//!
//! Total messages is defined as `greetings_received + acks_received`.
//! Schedule signals are tallied separately and excluded from it. After a
//! drain the total also includes traffic processed while draining, but the
//! rate still divides by the measurement window alone, so it reads slightly
//! high.
//!
//! Every average whose denominator can be zero is an `Option`; `None`
//! means "no data".

use crate::ant::AntSnapshot;
use serde::Serialize;
use std::time::Duration;

/// Aggregate statistics for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Ants observed
    pub population: usize,

    /// Ants that received at least one Schedule
    pub started_ants: usize,
    pub start_latency_total: Duration,
    pub start_latency_avg: Option<Duration>,

    pub greetings_sent_total: u64,
    pub greetings_sent_avg: Option<f64>,
    pub greetings_received_total: u64,
    pub greetings_received_avg: Option<f64>,
    pub acks_received_total: u64,
    pub acks_received_avg: Option<f64>,
    pub schedules_received_total: u64,

    pub total_messages: u64,
    /// Measured window the rate is computed over
    pub elapsed: Duration,
    /// Messages per second
    pub message_rate: Option<f64>,

    pub rtt_samples: u64,
    pub rtt_total: Duration,
    pub rtt_min: Option<Duration>,
    pub rtt_avg: Option<Duration>,
    pub rtt_max: Option<Duration>,
}

/// Single-pass accumulator over ant snapshots
#[derive(Debug, Clone, Default)]
pub struct Collector {
    population: usize,
    started_ants: usize,
    start_latency_total: Duration,
    greetings_sent: u64,
    greetings_received: u64,
    acks_received: u64,
    schedules_received: u64,
    rtt_samples: u64,
    rtt_total: Duration,
    rtt_min: Option<Duration>,
    rtt_max: Option<Duration>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one ant in. Each ant must be observed exactly once.
    pub fn observe(&mut self, ant: &AntSnapshot) {
        self.population += 1;

        if let Some(latency) = ant.start_latency {
            self.started_ants += 1;
            self.start_latency_total += latency;
        }

        self.greetings_sent += ant.greetings_sent;
        self.greetings_received += ant.greetings_received;
        self.acks_received += ant.acks_received;
        self.schedules_received += ant.schedules_received;

        for &rtt in &ant.round_trips {
            self.rtt_samples += 1;
            self.rtt_total += rtt;
            self.rtt_min = Some(self.rtt_min.map_or(rtt, |min| min.min(rtt)));
            self.rtt_max = Some(self.rtt_max.map_or(rtt, |max| max.max(rtt)));
        }
    }

    pub fn finish(self, elapsed: Duration) -> Report {
        let total_messages = self.greetings_received + self.acks_received;
        let message_rate = if elapsed.is_zero() {
            None
        } else {
            Some(total_messages as f64 / elapsed.as_secs_f64())
        };

        Report {
            population: self.population,
            started_ants: self.started_ants,
            start_latency_total: self.start_latency_total,
            start_latency_avg: mean_duration(self.start_latency_total, self.started_ants as u64),
            greetings_sent_total: self.greetings_sent,
            greetings_sent_avg: per_ant(self.greetings_sent, self.population),
            greetings_received_total: self.greetings_received,
            greetings_received_avg: per_ant(self.greetings_received, self.population),
            acks_received_total: self.acks_received,
            acks_received_avg: per_ant(self.acks_received, self.population),
            schedules_received_total: self.schedules_received,
            total_messages,
            elapsed,
            message_rate,
            rtt_samples: self.rtt_samples,
            rtt_total: self.rtt_total,
            rtt_min: self.rtt_min,
            rtt_avg: mean_duration(self.rtt_total, self.rtt_samples),
            rtt_max: self.rtt_max,
        }
    }
}

/// Reduce a full set of snapshots in one call
pub fn reduce<'a>(ants: impl IntoIterator<Item = &'a AntSnapshot>, elapsed: Duration) -> Report {
    let mut collector = Collector::new();
    for ant in ants {
        collector.observe(ant);
    }
    collector.finish(elapsed)
}

fn mean_duration(total: Duration, count: u64) -> Option<Duration> {
    if count == 0 {
        return None;
    }
    let nanos = total.as_nanos() / u128::from(count);
    Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
}

fn per_ant(total: u64, population: usize) -> Option<f64> {
    (population > 0).then(|| total as f64 / population as f64)
}
