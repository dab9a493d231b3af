//! Restart policies.
//!
//! This module holds the knob that controls **whether** a completed service is
//! restarted.
//!
//! ## Contents
//! - [`RetryBudget`] one shared counter bounding restarts across all services
//!
//! ## Quick wiring
//! ```text
//! SupervisorConfig { retries: R, .. }
//!      └─► core::supervisor uses:
//!           - RetryBudget::new(R)
//!           - budget.consume() once per observed completion → Restart | Exhausted
//! ```

mod budget;

pub use budget::{RetryBudget, Verdict};
