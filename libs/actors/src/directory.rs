//! Ant Directory
//!
//! Fixed-size lookup from [`AntId`] to the ant's inbox. Built once before any
//! task starts and never mutated, so it is shared by `Arc` and read without
//! locks.

use crate::ant::AntSnapshot;
use crate::error::{ColonyError, Result};
use crate::message::{AntId, Envelope, Message};
use tokio::sync::{mpsc, oneshot};

/// Receiving half of an ant's inbox
pub type InboxReceiver = mpsc::Receiver<Envelope>;

/// Handle to an ant: its id and the sending half of its inbox
#[derive(Debug, Clone)]
pub struct AntRef {
    id: AntId,
    inbox: mpsc::Sender<Envelope>,
}

impl AntRef {
    pub fn id(&self) -> AntId {
        self.id
    }

    /// Hand a message to the inbox, waiting while it is full
    pub async fn deliver(&self, message: Message) -> Result<()> {
        self.inbox
            .send(Envelope::Deliver(message))
            .await
            .map_err(|_| ColonyError::InboxClosed { ant: self.id })
    }

    /// Ask the ant for a snapshot; answered after everything queued before it
    pub async fn inspect(&self) -> Result<AntSnapshot> {
        let (reply, response) = oneshot::channel();
        self.inbox
            .send(Envelope::Inspect(reply))
            .await
            .map_err(|_| ColonyError::InboxClosed { ant: self.id })?;

        response
            .await
            .map_err(|_| ColonyError::InspectionFailed { ant: self.id })
    }
}

/// Index-addressed registry of every ant in the colony
#[derive(Debug)]
pub struct Directory {
    ants: Vec<AntRef>,
}

impl Directory {
    /// Create `population` inboxes of `capacity` each. The receivers are
    /// returned in id order for the ants to own.
    pub fn with_inboxes(population: usize, capacity: usize) -> (Self, Vec<InboxReceiver>) {
        let mut ants = Vec::with_capacity(population);
        let mut receivers = Vec::with_capacity(population);

        for index in 0..population {
            let (sender, receiver) = mpsc::channel(capacity);
            ants.push(AntRef {
                id: AntId::new(index),
                inbox: sender,
            });
            receivers.push(receiver);
        }

        (Self { ants }, receivers)
    }

    /// Look up an ant.
    ///
    /// # Panics
    ///
    /// If `id` is outside the directory. Every id an ant or the driver
    /// produces is drawn from `0..len()`.
    pub fn get(&self, id: AntId) -> &AntRef {
        &self.ants[id.index()]
    }

    pub fn len(&self) -> usize {
        self.ants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AntRef> {
        self.ants.iter()
    }
}
