//! Runtime core: orchestration and lifecycle.
//!
//! The public API from this module is [`Supervisor`] (with its builder and
//! configuration), the [`ShutdownSource`] seam, and the [`RunReport`] a run
//! returns.
//!
//! Internal modules:
//! - [`supervisor`]: restart loop, retry budget accounting, shutdown/drain;
//! - [`shutdown`]: external shutdown sources (OS signals, cancellation token);
//! - [`config`]: construction-time settings;
//! - [`report`]: what a run observed;
//! - [`builder`]: supervisor construction.

mod builder;
mod config;
mod report;
mod shutdown;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use config::{NEVER_FAIL_TIMEOUT, SupervisorConfig};
pub use report::{CompletionRecord, DrainOutcome, ExitReason, RunReport};
pub use shutdown::{OsSignals, ShutdownSource};
pub use supervisor::Supervisor;
