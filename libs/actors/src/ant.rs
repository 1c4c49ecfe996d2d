//! Ant Actor
//!
//! One ant per task. The receive loop is the only writer of the ant's
//! counters and round-trip samples; messages are processed strictly one at a
//! time, which is what makes the plain (non-atomic) counters sound.
//!
//! | Received | Effect                              | Emits                           |
//! |----------|-------------------------------------|---------------------------------|
//! | Schedule | first one marks start completion    | greetings to random peers       |
//! | Greeting | `greetings_received += 1`           | Ack to origin, Greeting onward  |
//! | Ack      | round trip sample appended          | nothing                         |
//!
//! Every outgoing message travels in its own spawned task. The sender's
//! `greetings_sent` is bumped by that task after the handoff succeeds, so it
//! can lag the logical send while traffic is live.

use crate::directory::InboxReceiver;
use crate::message::{AntId, Envelope, Message, MessageKind};
use crate::network::Network;
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Draw a greeting target uniformly from `0..population`, redrawing while
/// the draw is `own`.
///
/// # Panics
///
/// If `population < 2`: no valid target exists and the redraw would never
/// end. Colony construction rejects such populations.
pub fn select_peer<R: Rng + ?Sized>(rng: &mut R, own: AntId, population: usize) -> AntId {
    assert!(population >= 2, "select_peer needs at least two ants");
    loop {
        let candidate = rng.gen_range(0..population);
        if candidate != own.index() {
            return AntId::new(candidate);
        }
    }
}

/// Read-only copy of an ant's counters, taken inside its receive loop
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AntSnapshot {
    pub id: AntId,
    /// Construction to first Schedule; `None` if never scheduled
    pub start_latency: Option<Duration>,
    pub greetings_sent: u64,
    pub greetings_received: u64,
    pub acks_received: u64,
    pub schedules_received: u64,
    pub round_trips: Vec<Duration>,
}

impl AntSnapshot {
    pub fn empty(id: AntId) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    pub fn is_started(&self) -> bool {
        self.start_latency.is_some()
    }
}

/// A message-driven ant
pub struct Ant {
    id: AntId,
    inbox: InboxReceiver,
    network: Arc<Network>,
    rng: StdRng,

    /// Written by this ant's send tasks after each successful greeting handoff
    greetings_sent: Arc<AtomicU64>,

    created_at: Instant,
    start_completed: Option<Instant>,
    greetings_received: u64,
    acks_received: u64,
    schedules_received: u64,
    round_trips: Vec<Duration>,
}

impl Ant {
    pub fn new(id: AntId, inbox: InboxReceiver, network: Arc<Network>, rng: StdRng) -> Self {
        Self {
            id,
            inbox,
            network,
            rng,
            greetings_sent: Arc::new(AtomicU64::new(0)),
            created_at: Instant::now(),
            start_completed: None,
            greetings_received: 0,
            acks_received: 0,
            schedules_received: 0,
            round_trips: Vec::new(),
        }
    }

    pub fn id(&self) -> AntId {
        self.id
    }

    /// Receive loop. Runs until every sender of the inbox is gone or the
    /// task is aborted.
    pub async fn run(mut self) {
        while let Some(envelope) = self.inbox.recv().await {
            match envelope {
                Envelope::Deliver(message) => {
                    self.handle(message).await;
                    self.network.metrics().record_processed();
                }
                Envelope::Inspect(reply) => {
                    // Requester gave up; nothing to do
                    let _ = reply.send(self.snapshot());
                }
            }
        }

        trace!(ant = %self.id, "Inbox closed, receive loop exiting");
    }

    async fn handle(&mut self, message: Message) {
        match message.kind() {
            MessageKind::Schedule => {
                self.schedules_received += 1;
                self.start_completed.get_or_insert_with(Instant::now);

                for _ in 0..self.network.settings().greetings_per_schedule {
                    self.send_greeting();
                }
            }
            MessageKind::Greeting => {
                let Some(origin) = message.origin() else {
                    warn!(ant = %self.id, "Greeting without origin ignored");
                    return;
                };

                let processing = self.network.settings().greeting_processing;
                if !processing.is_zero() {
                    tokio::time::sleep(processing).await;
                }

                self.send(origin, Message::ack(&message));
                self.greetings_received += 1;

                // Forward the greeting to another ant
                self.send_greeting();
            }
            MessageKind::Ack => {
                self.acks_received += 1;
                self.round_trips
                    .push(Instant::now().saturating_duration_since(message.sent_at()));
            }
        }
    }

    fn send_greeting(&mut self) {
        if self.network.is_halted() {
            return;
        }

        let target = select_peer(&mut self.rng, self.id, self.network.population());
        self.send(target, Message::greeting());
    }

    /// Stamp and dispatch `message` in its own task
    fn send(&self, target: AntId, message: Message) {
        let message = message.stamped(self.id);
        let network = Arc::clone(&self.network);
        let sent_counter = match message.kind() {
            MessageKind::Greeting => Some(Arc::clone(&self.greetings_sent)),
            _ => None,
        };

        network.metrics().record_send_spawned();
        tokio::spawn(async move {
            let delivered = match network.directory().get(target).deliver(message).await {
                Ok(()) => {
                    if let Some(counter) = sent_counter {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    true
                }
                Err(e) => {
                    trace!(error = %e, "Send abandoned");
                    false
                }
            };
            network.metrics().record_send_finished(delivered);
        });
    }

    pub fn snapshot(&self) -> AntSnapshot {
        AntSnapshot {
            id: self.id,
            start_latency: self
                .start_completed
                .map(|done| done.saturating_duration_since(self.created_at)),
            greetings_sent: self.greetings_sent.load(Ordering::Relaxed),
            greetings_received: self.greetings_received,
            acks_received: self.acks_received,
            schedules_received: self.schedules_received,
            round_trips: self.round_trips.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{AntRef, Directory};
    use crate::driver::inject_schedule;
    use crate::network::AntSettings;
    use proptest::prelude::*;
    use rand::SeedableRng;

    struct Harness {
        network: Arc<Network>,
        /// Inboxes the test reads by hand, indexed by ant id
        inboxes: Vec<Option<InboxReceiver>>,
    }

    impl Harness {
        fn new(population: usize, settings: AntSettings) -> Self {
            let (directory, receivers) = Directory::with_inboxes(population, 64);
            Self {
                network: Arc::new(Network::new(directory, settings)),
                inboxes: receivers.into_iter().map(Some).collect(),
            }
        }

        /// Start ant `index`'s receive loop; the test no longer sees its inbox
        fn spawn(&mut self, index: usize) -> AntRef {
            let inbox = self.inboxes[index].take().unwrap();
            let ant = Ant::new(
                AntId::new(index),
                inbox,
                Arc::clone(&self.network),
                StdRng::seed_from_u64(index as u64 + 11),
            );
            tokio::spawn(ant.run());
            self.network.directory().get(AntId::new(index)).clone()
        }

        /// Deliver a message as if ant `from` had sent it
        async fn play(&self, from: usize, to: usize, message: Message) {
            let metrics = self.network.metrics();
            metrics.record_send_spawned();
            self.network
                .directory()
                .get(AntId::new(to))
                .deliver(message.stamped(AntId::new(from)))
                .await
                .unwrap();
            metrics.record_send_finished(true);
        }

        async fn settle(&self) {
            for _ in 0..1000 {
                if self.network.metrics().sends_in_flight() == 0 {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            panic!("send tasks never finished");
        }

        /// Drain every hand-read inbox
        fn collect(&mut self) -> Vec<(AntId, Message)> {
            let mut seen = Vec::new();
            for (index, inbox) in self.inboxes.iter_mut().enumerate() {
                if let Some(inbox) = inbox {
                    while let Ok(envelope) = inbox.try_recv() {
                        match envelope {
                            Envelope::Deliver(msg) => seen.push((AntId::new(index), msg)),
                            Envelope::Inspect(_) => panic!("unexpected inspection"),
                        }
                    }
                }
            }
            seen
        }
    }

    #[tokio::test]
    async fn test_schedule_sends_one_greeting_to_a_peer() {
        let mut harness = Harness::new(4, AntSettings::default());
        let ant = harness.spawn(0);

        inject_schedule(&harness.network, AntId::new(0)).await.unwrap();
        let snapshot = ant.inspect().await.unwrap();
        harness.settle().await;

        assert!(snapshot.is_started());
        assert_eq!(snapshot.schedules_received, 1);

        let seen = harness.collect();
        assert_eq!(seen.len(), 1);
        let (target, greeting) = &seen[0];
        assert_ne!(*target, AntId::new(0));
        assert_eq!(greeting.kind(), MessageKind::Greeting);
        assert_eq!(greeting.origin(), Some(AntId::new(0)));

        assert_eq!(ant.inspect().await.unwrap().greetings_sent, 1);
    }

    #[tokio::test]
    async fn test_greeting_acks_origin_and_forwards() {
        let mut harness = Harness::new(4, AntSettings::default());
        let ant = harness.spawn(1);

        let greeting = Message::greeting();
        harness.play(0, 1, greeting.clone()).await;
        let snapshot = ant.inspect().await.unwrap();
        harness.settle().await;

        assert_eq!(snapshot.greetings_received, 1);
        assert!(!snapshot.is_started());

        let seen = harness.collect();
        assert_eq!(seen.len(), 2);

        let acks: Vec<_> = seen.iter().filter(|(_, m)| m.kind() == MessageKind::Ack).collect();
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].0, AntId::new(0));
        assert_eq!(acks[0].1.origin(), Some(AntId::new(1)));
        assert_eq!(acks[0].1.sent_at(), greeting.sent_at());

        let forwarded: Vec<_> = seen
            .iter()
            .filter(|(_, m)| m.kind() == MessageKind::Greeting)
            .collect();
        assert_eq!(forwarded.len(), 1);
        assert_ne!(forwarded[0].0, AntId::new(1));
    }

    #[tokio::test]
    async fn test_ack_records_round_trip() {
        let mut harness = Harness::new(2, AntSettings::default());
        let ant = harness.spawn(0);

        let greeting = Message::greeting().stamped(AntId::new(0));
        harness.play(1, 0, Message::ack(&greeting)).await;

        let snapshot = ant.inspect().await.unwrap();
        assert_eq!(snapshot.acks_received, 1);
        assert_eq!(snapshot.round_trips.len(), 1);
        assert!(snapshot.round_trips[0] >= Duration::ZERO);
        assert_eq!(snapshot.greetings_sent, 0);
        assert!(harness.collect().is_empty());
    }

    #[tokio::test]
    async fn test_halted_ant_still_acks_but_stops_forwarding() {
        let mut harness = Harness::new(3, AntSettings::default());
        let ant = harness.spawn(2);
        harness.network.halt();

        harness.play(0, 2, Message::greeting()).await;
        inject_schedule(&harness.network, AntId::new(2)).await.unwrap();
        let snapshot = ant.inspect().await.unwrap();
        harness.settle().await;

        assert_eq!(snapshot.greetings_received, 1);
        assert!(snapshot.is_started());

        let seen = harness.collect();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, AntId::new(0));
        assert_eq!(seen[0].1.kind(), MessageKind::Ack);
    }

    #[tokio::test]
    async fn test_start_marked_by_first_schedule_only() {
        let mut harness = Harness::new(2, AntSettings::default());
        let ant = harness.spawn(0);

        inject_schedule(&harness.network, AntId::new(0)).await.unwrap();
        let first = ant.inspect().await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        inject_schedule(&harness.network, AntId::new(0)).await.unwrap();
        let second = ant.inspect().await.unwrap();

        assert_eq!(second.schedules_received, 2);
        assert_eq!(first.start_latency, second.start_latency);
    }

    #[tokio::test]
    async fn test_greetings_per_schedule() {
        let settings = AntSettings {
            greetings_per_schedule: 3,
            ..Default::default()
        };
        let mut harness = Harness::new(5, settings);
        let ant = harness.spawn(0);

        inject_schedule(&harness.network, AntId::new(0)).await.unwrap();
        ant.inspect().await.unwrap();
        harness.settle().await;

        let seen = harness.collect();
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|(target, _)| *target != AntId::new(0)));
        assert_eq!(ant.inspect().await.unwrap().greetings_sent, 3);
    }

    #[tokio::test]
    async fn test_processing_delay_applies_to_greetings() {
        let settings = AntSettings {
            greeting_processing: Duration::from_millis(20),
            ..Default::default()
        };
        let mut harness = Harness::new(2, settings);
        let ant = harness.spawn(1);

        let started = Instant::now();
        harness.play(0, 1, Message::greeting()).await;
        ant.inspect().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    #[should_panic]
    fn test_lone_ant_has_no_peer() {
        let mut rng = StdRng::seed_from_u64(1);
        select_peer(&mut rng, AntId::new(0), 1);
    }

    proptest! {
        #[test]
        fn prop_never_selects_self(seed in any::<u64>(), population in 2usize..64, own in 0usize..64) {
            let own = AntId::new(own % population);
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..200 {
                let target = select_peer(&mut rng, own, population);
                prop_assert_ne!(target, own);
                prop_assert!(target.index() < population);
            }
        }
    }
}
