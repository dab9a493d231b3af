//! # Service abstractions.
//!
//! This module provides the service-side types:
//! - [`ServiceSpec`] - name and timeout the supervisor builds a service from
//! - [`Service`] - one named unit of work with a single-owner start/stop contract
//! - [`Completion`] - one-shot handle carrying a run's terminal outcome

mod completion;
mod service;
mod spec;

pub use completion::{Completion, Outcome};
pub use service::Service;
pub use spec::ServiceSpec;
