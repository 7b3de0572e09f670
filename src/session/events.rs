//! Discrete events delivered to the measurement system.
//!
//! Session lifecycle and input arrive independently of the tracking cycle.
//! Hosts either dispatch them directly or post them to an [`EventQueue`],
//! which the system drains between cycles so that every event runs to
//! completion without interleaving with cycle work.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::types::{ReferenceSpace, SessionId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// A tracking session became active. `reference_space` is the session's
    /// base space in which hit poses are resolved.
    SessionStart {
        session: SessionId,
        reference_space: ReferenceSpace,
    },
    /// The active session ended.
    SessionEnd,
    /// Discrete tap/select input. Carries no payload.
    Select,
}

/// Multi-producer queue of [`AppEvent`]s consumed by a single control loop.
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Handle for producers (input and session callbacks).
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }

    pub fn push(&self, event: AppEvent) {
        // The queue owns a receiver, so the channel cannot be disconnected.
        let _ = self.tx.send(event);
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Take every event queued so far, in arrival order.
    pub fn drain(&self) -> Vec<AppEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
