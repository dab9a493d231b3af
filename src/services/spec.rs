//! # Service specification.
//!
//! [`ServiceSpec`] describes a service before it exists: its stable name and the
//! timeout after which, absent cancellation, a run fails. The supervisor turns
//! each spec into a [`Service`](crate::Service), applying never-fail mode on the way.

use std::{sync::Arc, time::Duration};

/// Name and timeout of a supervised service.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use svcvisor::ServiceSpec;
///
/// let spec = ServiceSpec::new("a", Duration::from_secs(3));
/// assert_eq!(spec.name(), "a");
/// assert_eq!(spec.timeout(), Duration::from_secs(3));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceSpec {
    name: Arc<str>,
    timeout: Duration,
}

impl ServiceSpec {
    /// Creates a spec for a service named `name` that fails after `timeout`.
    pub fn new(name: impl Into<Arc<str>>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            timeout,
        }
    }

    /// Returns the service name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }
}
