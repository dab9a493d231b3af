//! # LogWriter: events as `tracing` records
//!
//! Renders every [`Event`] as one structured log line. Install a
//! `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output
//! ```text
//! INFO service started service="b" timeout=2s
//! WARN service timed out service="b" timeout=2s
//! WARN service failed service="b" err="service b timed out after 2s"
//! INFO service restarted service="b"
//! INFO retries remaining remaining=1
//! INFO shutdown requested cause="SIGINT"
//! INFO shutting down
//! INFO service stopped service="a"
//! INFO all services drained
//! ```
//!
//! `retries remaining` is logged after the completion has been charged:
//! with a budget of 2 the lines read 1, 0, 0. Nothing is logged for the
//! budget before the first completion.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let service = e.service.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::ServiceStarting => {
                info!(service, timeout = ?e.timeout, "service started");
            }
            EventKind::ServiceStopped => {
                info!(service, "service stopped");
            }
            EventKind::ServiceTimedOut => {
                warn!(service, timeout = ?e.timeout, "service timed out");
            }
            EventKind::ServiceFailed => {
                warn!(service, err = reason, "service failed");
            }
            EventKind::ServiceRestarted => {
                info!(service, "service restarted");
            }
            EventKind::ShutdownRequested => {
                info!(cause = reason, "shutdown requested");
            }
            EventKind::BudgetRemaining => {
                info!(remaining = e.remaining.unwrap_or(0), "retries remaining");
            }
            EventKind::BudgetExhausted => {
                warn!(service, "retry budget exhausted");
            }
            EventKind::ShuttingDown => {
                info!("shutting down");
            }
            EventKind::DrainFailed => {
                error!(service, err = reason, "service error during drain");
            }
            EventKind::AllDrained => {
                info!("all services drained");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = service, reason, "subscriber dropped event");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = service, info = reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
