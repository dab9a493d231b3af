//! # Service: one named unit of asynchronous work.
//!
//! A [`Service`] runs a placeholder workload: it waits until either its
//! timeout elapses (failure) or its cancellation token fires (clean stop).
//!
//! ## State machine
//! ```text
//! Idle ──start()──► Running ──┬── timer first  ──► Completed-Err(ServiceError::Timeout)
//!                             └── token first  ──► Completed-Ok
//! Completed-* ──start()──► Running (fresh token, fresh completion)
//! ```
//!
//! ## Event flow
//! ```text
//! start() → ServiceStarting → [race] → ServiceTimedOut (timer)
//!                                    → ServiceStopped  (token)
//! ```
//!
//! ## Rules
//! - `start` takes `&mut self`: at most one caller can start or replace a run.
//! - Every `start` allocates a **new** [`CancellationToken`]; old tokens are never reused.
//! - `stop` only flips the current token. It never waits and never fails,
//!   no matter how often or when it is called.
//! - The caller must read the returned [`Completion`] before starting again,
//!   otherwise the previous worker is never observed.

use std::{sync::Arc, time::Duration};

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::{
    error::ServiceError,
    events::{Bus, Event, EventKind},
    services::{Completion, Outcome},
};

/// Named unit of work with a single-owner start/stop contract.
#[derive(Debug)]
pub struct Service {
    name: Arc<str>,
    /// Timeout reported in errors and events.
    timeout: Duration,
    /// Timeout the timer actually runs with (differs in never-fail mode).
    effective: Duration,
    token: CancellationToken,
    bus: Bus,
}

impl Service {
    /// Creates an idle service that fails `timeout` after each start.
    pub fn new(name: impl Into<Arc<str>>, timeout: Duration, bus: Bus) -> Self {
        Self::with_effective_timeout(name, timeout, timeout, bus)
    }

    /// Creates an idle service whose timer runs for `effective` while errors
    /// still report the configured `timeout`.
    pub fn with_effective_timeout(
        name: impl Into<Arc<str>>,
        timeout: Duration,
        effective: Duration,
        bus: Bus,
    ) -> Self {
        Self {
            name: name.into(),
            timeout,
            effective,
            token: CancellationToken::new(),
            bus,
        }
    }

    /// Service name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// Configured timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// True if cancellation has been requested for the current run.
    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Begins a new run on the tokio runtime and returns its completion handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Completion {
        self.token = CancellationToken::new();

        let worker = run(
            Arc::clone(&self.name),
            self.timeout,
            self.effective,
            self.token.clone(),
            self.bus.clone(),
        );
        Completion::new(Arc::clone(&self.name), tokio::spawn(worker))
    }

    /// Requests cooperative cancellation of the current run.
    ///
    /// Returns immediately; a no-op before the first start, after the run
    /// ended, or when called repeatedly.
    pub fn stop(&self) {
        self.token.cancel();
    }
}

/// Body of one run: races the timer against the cancellation token.
async fn run(
    name: Arc<str>,
    timeout: Duration,
    effective: Duration,
    token: CancellationToken,
    bus: Bus,
) -> Outcome {
    bus.publish(
        Event::new(EventKind::ServiceStarting)
            .with_service(Arc::clone(&name))
            .with_timeout(timeout),
    );

    select! {
        _ = time::sleep(effective) => {
            bus.publish(
                Event::new(EventKind::ServiceTimedOut)
                    .with_service(Arc::clone(&name))
                    .with_timeout(timeout),
            );
            Err(ServiceError::Timeout { service: name, timeout })
        }
        _ = token.cancelled() => {
            bus.publish(Event::new(EventKind::ServiceStopped).with_service(name));
            Ok(())
        }
    }
}
