//! # Runtime events emitted by services and the supervisor.
//!
//! The [`EventKind`] enum classifies events across two groups:
//! - **Service events**: one run's lifecycle (starting, stopped, timed out)
//! - **Supervisor events**: restart loop and shutdown/drain protocol
//! - **Subscriber events**: health of the subscriber fan-out (overflow, panic)
//!
//! The [`Event`] struct carries optional metadata (service name, timeout,
//! reason, remaining budget) plus a timestamp and a global sequence number.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use svcvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ServiceTimedOut)
//!     .with_service("b")
//!     .with_timeout(Duration::from_secs(2));
//!
//! assert_eq!(ev.kind, EventKind::ServiceTimedOut);
//! assert_eq!(ev.service.as_deref(), Some("b"));
//! assert_eq!(ev.timeout, Some(Duration::from_secs(2)));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Service events (published by the worker) ===
    /// A service run has started.
    ///
    /// Sets: `service`, `timeout` (configured).
    ServiceStarting,

    /// A service run ended because its cancellation token fired.
    ///
    /// Sets: `service`.
    ServiceStopped,

    /// A service run ended because its timer fired first.
    ///
    /// Sets: `service`, `timeout` (configured).
    ServiceTimedOut,

    // === Supervisor events ===
    /// The supervisor observed a completion carrying an error.
    ///
    /// Sets: `service`, `reason`.
    ServiceFailed,

    /// The supervisor started a fresh run of a completed service.
    ///
    /// Sets: `service`.
    ServiceRestarted,

    /// The external shutdown source fired.
    ///
    /// Sets: `reason` (cause reported by the source).
    ShutdownRequested,

    /// One restart-loop iteration finished.
    ///
    /// Sets: `remaining`.
    BudgetRemaining,

    /// The last permitted completion was consumed; no restart was issued.
    ///
    /// Sets: `service` (the service whose completion exhausted the budget).
    BudgetExhausted,

    /// The loop ended; every service is being cancelled.
    ShuttingDown,

    /// A drain read surfaced an error.
    ///
    /// Sets: `service`, `reason`.
    DrainFailed,

    /// Every completion has been read to its terminal state.
    AllDrained,

    // === Subscriber events ===
    /// A subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `service` (subscriber name), `reason` ("full" or "closed").
    SubscriberOverflow,

    /// A subscriber panicked while handling an event.
    ///
    /// Sets: `service` (subscriber name), `reason` (panic message).
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the service, if applicable.
    pub service: Option<Arc<str>>,
    /// Configured service timeout.
    pub timeout: Option<Duration>,
    /// Human-readable reason (errors, shutdown cause).
    pub reason: Option<Arc<str>>,
    /// Retry budget left after a loop iteration.
    pub remaining: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            service: None,
            timeout: None,
            reason: None,
            remaining: None,
        }
    }

    /// Attaches a service name.
    #[inline]
    pub fn with_service(mut self, service: impl Into<Arc<str>>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Attaches a timeout duration.
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches the remaining retry budget.
    #[inline]
    pub fn with_remaining(mut self, n: u32) -> Self {
        self.remaining = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_service(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_service(subscriber)
            .with_reason(info)
    }
}
