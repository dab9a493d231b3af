//! Error types used by the svcvisor runtime and its services.
//!
//! This module defines two enums:
//!
//! - [`RuntimeError`]: errors raised while setting up the orchestration itself.
//! - [`ServiceError`]: the terminal error a single service run may report.
//!
//! [`RuntimeError::as_label`] gives a stable label for logs.
//!
//! A [`ServiceError`] is never fatal to the supervisor: it is an input to the
//! restart-or-stop decision. Budget exhaustion is not an error at all.

use std::{io, sync::Arc, time::Duration};
use thiserror::Error;

/// # Errors produced by the svcvisor runtime.
///
/// These are setup failures: once [`Supervisor::run`](crate::Supervisor::run)
/// has started the first service it always runs to a full drain.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Two service specs share a name; names address restarts, so they must be unique.
    #[error("duplicate service name {name:?}")]
    DuplicateService {
        /// The repeated name.
        name: String,
    },

    /// Registering the OS signal handlers failed.
    #[error("failed to register shutdown signals: {0}")]
    Signals(#[from] io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use svcvisor::RuntimeError;
    ///
    /// let err = RuntimeError::DuplicateService { name: "a".into() };
    /// assert_eq!(err.as_label(), "runtime_duplicate_service");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::DuplicateService { .. } => "runtime_duplicate_service",
            RuntimeError::Signals(_) => "runtime_signals",
        }
    }
}

/// # Errors produced by a service run.
///
/// Carried by a [`Completion`](crate::Completion); the cooperative-stop path
/// produces no error.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use svcvisor::ServiceError;
///
/// let err = ServiceError::Timeout { service: "b".into(), timeout: Duration::from_secs(2) };
/// assert_eq!(err.to_string(), "service b timed out after 2s");
/// ```
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service's timer fired before its cancellation token.
    #[error("service {service} timed out after {timeout:?}")]
    Timeout {
        /// Name of the service.
        service: Arc<str>,
        /// Configured timeout of the service.
        timeout: Duration,
    },

    /// The worker panicked or was aborted before producing an outcome.
    #[error("service {service} crashed: {reason}")]
    Crashed {
        /// Name of the service.
        service: Arc<str>,
        /// Panic payload or abort description.
        reason: String,
    },
}
