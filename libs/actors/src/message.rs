//! Colony Messages
//!
//! Wire events exchanged between ants, plus the inbox envelope that also
//! carries inspection requests from the collector.

use crate::ant::AntSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tokio::sync::oneshot;

/// Index of an ant in the directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AntId(usize);

impl AntId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AntId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ant-{}", self.0)
    }
}

impl From<usize> for AntId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Kind tag of a wire event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Peer-initiated, opens a round trip
    Greeting,
    /// Closes a greeting's round trip
    Ack,
    /// Externally injected start signal
    Schedule,
}

/// One event between two ants.
///
/// `origin` is unset until the sender stamps it at dispatch; a Schedule
/// from the driver never gets one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    origin: Option<AntId>,
    sent_at: Instant,
}

impl Message {
    /// A fresh greeting timestamped now
    pub fn greeting() -> Self {
        Self::new(MessageKind::Greeting, Instant::now())
    }

    /// Ack for `greeting`, carrying the greeting's timestamp so the
    /// receiver measures the full round trip
    pub fn ack(greeting: &Message) -> Self {
        Self::new(MessageKind::Ack, greeting.sent_at)
    }

    /// Start signal timestamped now
    pub fn schedule() -> Self {
        Self::new(MessageKind::Schedule, Instant::now())
    }

    fn new(kind: MessageKind, sent_at: Instant) -> Self {
        Self {
            kind,
            origin: None,
            sent_at,
        }
    }

    /// Fill in the sender, overwriting the placeholder
    pub fn stamped(self, origin: AntId) -> Self {
        Self {
            origin: Some(origin),
            ..self
        }
    }

    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    pub fn origin(&self) -> Option<AntId> {
        self.origin
    }

    pub fn sent_at(&self) -> Instant {
        self.sent_at
    }
}

/// What an inbox carries
#[derive(Debug)]
pub enum Envelope {
    /// A wire event to process
    Deliver(Message),
    /// Snapshot request, answered in inbox order
    Inspect(oneshot::Sender<AntSnapshot>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_fills_origin_once() {
        let msg = Message::greeting();
        assert_eq!(msg.origin(), None);

        let stamped = msg.stamped(AntId::new(3));
        assert_eq!(stamped.origin(), Some(AntId::new(3)));
        assert_eq!(stamped.kind(), MessageKind::Greeting);
    }

    #[test]
    fn test_ack_carries_greeting_timestamp() {
        let greeting = Message::greeting().stamped(AntId::new(1));
        let ack = Message::ack(&greeting);

        assert_eq!(ack.kind(), MessageKind::Ack);
        assert_eq!(ack.sent_at(), greeting.sent_at());
        assert_eq!(ack.origin(), None);
    }

    #[test]
    fn test_ant_id_display() {
        assert_eq!(AntId::new(42).to_string(), "ant-42");
        assert_eq!(AntId::from(7).index(), 7);
    }
}
