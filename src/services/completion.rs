//! # One-shot completion handle.
//!
//! A [`Completion`] is returned by every [`Service::start`](crate::Service::start).
//! It wraps the worker's join handle and yields the run's terminal outcome
//! **exactly once**; afterwards it is *consumed* and every further wait
//! returns `None` immediately ("no more values").
//!
//! ```text
//! Pending ──(worker ends)──► wait() = Some(Ok(()) | Err(ServiceError)) ──► Consumed
//! Consumed ───────────────► wait() = None
//! ```
//!
//! ## Rules
//! - `poll_wait` is cancel-safe: dropping an in-flight wait loses nothing.
//! - Reading the terminal value joins the worker; a consumed handle means the
//!   worker task has fully finished.
//! - A panicking worker is reported as [`ServiceError::Crashed`].

use std::{
    future::{Future, poll_fn},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tokio::task::{JoinError, JoinHandle};

use crate::error::ServiceError;

/// Terminal outcome of one service run.
pub type Outcome = Result<(), ServiceError>;

/// One-shot handle carrying a service run's terminal outcome.
#[derive(Debug)]
#[must_use = "a completion must be waited on, or its worker is never observed"]
pub struct Completion {
    service: Arc<str>,
    handle: Option<JoinHandle<Outcome>>,
}

impl Completion {
    pub(crate) fn new(service: Arc<str>, handle: JoinHandle<Outcome>) -> Self {
        Self {
            service,
            handle: Some(handle),
        }
    }

    /// True once the terminal value has been read.
    #[inline]
    pub fn is_consumed(&self) -> bool {
        self.handle.is_none()
    }

    /// Waits for the terminal value.
    ///
    /// Returns `Some(outcome)` the first time, `None` on every later call.
    pub async fn wait(&mut self) -> Option<Outcome> {
        poll_fn(|cx| self.poll_wait(cx)).await
    }

    /// Poll form of [`Completion::wait`], used to multiplex many completions.
    pub fn poll_wait(&mut self, cx: &mut Context<'_>) -> Poll<Option<Outcome>> {
        let Some(handle) = self.handle.as_mut() else {
            return Poll::Ready(None);
        };
        match Pin::new(handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(joined) => {
                self.handle = None;
                Poll::Ready(Some(joined.unwrap_or_else(|e| Err(self.crashed(e)))))
            }
        }
    }

    fn crashed(&self, err: JoinError) -> ServiceError {
        let reason = if err.is_panic() {
            let panic = err.into_panic();
            if let Some(s) = panic.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "worker panicked".to_string()
            }
        } else {
            "worker aborted".to_string()
        };
        ServiceError::Crashed {
            service: Arc::clone(&self.service),
            reason,
        }
    }
}
