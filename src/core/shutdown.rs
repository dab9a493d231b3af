//! # External shutdown sources.
//!
//! The supervisor multiplexes exactly one [`ShutdownSource`] alongside the
//! service completions. Firing it has the same effect as an exhausted retry
//! budget: the loop ends and every service is cancelled and drained.
//!
//! ## Implementations
//! - [`OsSignals`]: the process-level source.
//!   - **Unix**: `SIGINT` (Ctrl-C) and `SIGTERM` (systemd/Kubernetes stop).
//!   - **Other platforms**: Ctrl-C via [`tokio::signal::ctrl_c`].
//! - [`CancellationToken`]: programmatic shutdown (embedding, tests).

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RuntimeError;

/// Source of one external shutdown request.
#[async_trait]
pub trait ShutdownSource: Send {
    /// Completes once shutdown has been requested, returning a short cause label.
    ///
    /// Must be cancel-safe: the supervisor may poll it many times across
    /// loop iterations before it completes.
    async fn requested(&mut self) -> String;
}

#[async_trait]
impl ShutdownSource for CancellationToken {
    async fn requested(&mut self) -> String {
        self.cancelled().await;
        "cancelled".to_string()
    }
}

/// Termination signals of the host process.
///
/// Handlers are registered in [`OsSignals::new`], so registration failures
/// surface before any service has been started.
#[derive(Debug)]
pub struct OsSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl OsSignals {
    /// Registers the signal handlers.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// [`RuntimeError::Signals`] if a handler cannot be registered.
    #[cfg(unix)]
    pub fn new() -> Result<Self, RuntimeError> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    /// Registers the signal handlers.
    #[cfg(not(unix))]
    pub fn new() -> Result<Self, RuntimeError> {
        Ok(Self {})
    }
}

#[async_trait]
impl ShutdownSource for OsSignals {
    #[cfg(unix)]
    async fn requested(&mut self) -> String {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT".to_string(),
            _ = self.terminate.recv() => "SIGTERM".to_string(),
        }
    }

    #[cfg(not(unix))]
    async fn requested(&mut self) -> String {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        "ctrl-c".to_string()
    }
}
