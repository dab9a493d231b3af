//! # svcvisor
//!
//! **svcvisor** is a minimal service supervisor for tokio.
//!
//! It starts a fixed set of named services concurrently, restarts whichever
//! one terminates while a **shared** retry budget lasts, and on budget
//! exhaustion or an external shutdown request cancels every service and
//! waits for all of them to drain.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ServiceSpec  │   │ ServiceSpec  │   │ ServiceSpec  │
//!     │   ("a", 3s)  │   │   ("b", 2s)  │   │   ("c", 5s)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor::run(specs, shutdown)                                 │
//! │  - RetryBudget (one counter for all services)                     │
//! │  - Slots: Service + current Completion                            │
//! │  - ShutdownSource (OS signals / CancellationToken)                │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │  worker a    │   │  worker b    │   │  worker c    │   │
//!     │ timer|cancel │   │ timer|cancel │   │ timer|cancel │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ ServiceStarting  │ ServiceTimedOut  │ ServiceStopped  │ ServiceFailed
//!      ▼                  ▼                  ▼                 ▼ BudgetRemaining ...
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                    listener ──► SubscriberSet ──► LogWriter (tracing), custom...
//! ```
//!
//! ### Lifecycle
//! ```text
//! start every service
//! loop (at most R + 1 completions) {
//!   ├─► wait for shutdown OR any completion (shutdown wins ties)
//!   ├─ shutdown   ─► exit loop
//!   └─ completion ─► budget.consume()
//!         ├─ Restart   ─► start that one service again
//!         └─ Exhausted ─► exit loop
//! }
//! stop every service ─► wait on every completion ─► return RunReport
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Services**      | Start/stop units with one-shot completion handles.       | [`Service`], [`Completion`]             |
//! | **Supervision**   | Restart loop, shared budget, shutdown and drain.         | [`Supervisor`], [`RetryBudget`]         |
//! | **Shutdown**      | Pluggable external shutdown source.                      | [`ShutdownSource`], [`OsSignals`]       |
//! | **Subscriber API**| Hook into lifecycle events (logging, metrics, custom).   | [`Subscribe`], [`LogWriter`]            |
//! | **Errors**        | Typed errors for services and runtime setup.             | [`ServiceError`], [`RuntimeError`]      |
//! | **Configuration** | Retry budget, never-fail mode, bus capacity.             | [`SupervisorConfig`]                    |
//!
//! ## Example
//! ```rust
//! use std::{sync::Arc, time::Duration};
//! use tokio_util::sync::CancellationToken;
//! use svcvisor::{ExitReason, LogWriter, ServiceSpec, Subscribe, Supervisor, SupervisorConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SupervisorConfig { retries: 1, ..SupervisorConfig::default() };
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let sup = Supervisor::builder(cfg).with_subscribers(subs).build();
//!
//!     let specs = vec![ServiceSpec::new("flaky", Duration::from_millis(10))];
//!     let report = sup.run(specs, CancellationToken::new()).await?;
//!
//!     assert_eq!(report.exit, ExitReason::BudgetExhausted);
//!     assert_eq!(report.restarts(), 1);
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod policies;
mod services;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    CompletionRecord, DrainOutcome, ExitReason, NEVER_FAIL_TIMEOUT, OsSignals, RunReport,
    ShutdownSource, Supervisor, SupervisorBuilder, SupervisorConfig,
};
pub use error::{RuntimeError, ServiceError};
pub use events::{Bus, Event, EventKind, WeakBus};
pub use policies::{RetryBudget, Verdict};
pub use services::{Completion, Outcome, Service, ServiceSpec};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
