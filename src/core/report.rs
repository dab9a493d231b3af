//! # Run report.
//!
//! [`RunReport`] is what [`Supervisor::run`](crate::Supervisor::run) returns
//! once every service has been drained: why the loop ended, which completions
//! it consumed, and what the final drain read for each service.

use std::sync::Arc;

use crate::error::ServiceError;

/// Why the restart loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The last permitted completion was observed.
    BudgetExhausted,
    /// The external shutdown source fired with the given cause.
    ShutdownRequested(String),
    /// There was nothing left to wait on (empty service set).
    NothingToSupervise,
}

/// One completion consumed inside the restart loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    /// Service that completed.
    pub service: Arc<str>,
    /// Error it completed with (`None` for a clean stop).
    pub error: Option<ServiceError>,
    /// Whether a fresh run was started afterwards.
    pub restarted: bool,
    /// Retry budget left after this completion.
    pub remaining: u32,
}

/// What the final drain read for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The run ended through cancellation.
    Clean,
    /// The run ended with an error that the loop never observed.
    Failed(ServiceError),
    /// The terminal value was already consumed inside the loop.
    AlreadyObserved,
}

impl DrainOutcome {
    /// True if the drain surfaced an error.
    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, DrainOutcome::Failed(_))
    }
}

/// Summary of one supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Why the loop ended.
    pub exit: ExitReason,
    /// Completions consumed by the loop, in observation order.
    pub completions: Vec<CompletionRecord>,
    /// Drain outcome per service, in registration order.
    pub drained: Vec<(Arc<str>, DrainOutcome)>,
    /// False if the event listener died before delivering every event.
    pub events_flushed: bool,
}

impl RunReport {
    /// Number of restarts issued.
    pub fn restarts(&self) -> usize {
        self.completions.iter().filter(|c| c.restarted).count()
    }

    /// Drain outcome of the named service, if it was supervised.
    pub fn drain_of(&self, service: &str) -> Option<&DrainOutcome> {
        self.drained
            .iter()
            .find(|(name, _)| &**name == service)
            .map(|(_, outcome)| outcome)
    }
}
