//! # Event bus for broadcasting runtime events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from many sources (service workers, supervisor).
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Subscriber (one):
//!   Service a ──┐
//!   Service b ──┼──────► Bus ───────► listener ────► SubscriberSet
//!   Service c ──┤  (broadcast chan)   (per run)
//!   Supervisor ─┘
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: one ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **Close on drop**: once every clone of the bus is dropped, receivers observe `Closed`.
//!   A [`WeakBus`] does not keep the channel open.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone; every service holds its own clone.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers the event is dropped; this still returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Returns a handle that can publish without keeping the bus open.
    pub fn downgrade(&self) -> WeakBus {
        WeakBus {
            tx: self.tx.downgrade(),
        }
    }
}

/// Publisher handle that does not count towards keeping the bus open.
///
/// Used by consumers of the bus that also report into it (the subscriber
/// fan-out), so the bus still closes once every [`Bus`] clone is gone.
#[derive(Clone, Debug)]
pub struct WeakBus {
    tx: broadcast::WeakSender<Event>,
}

impl WeakBus {
    /// Publishes if the bus is still open.
    ///
    /// Hands the event back as `Err` once every [`Bus`] clone has been dropped.
    pub fn publish(&self, ev: Event) -> Result<(), Event> {
        match self.tx.upgrade() {
            Some(tx) => {
                let _ = tx.send(ev);
                Ok(())
            }
            None => Err(ev),
        }
    }
}
