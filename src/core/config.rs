//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`], the construction-time settings of a
//! [`Supervisor`](crate::Supervisor). There is no process-wide mutable state:
//! the never-fail switch travels with the config into every service it builds.
//!
//! ## Sentinel values
//! - `retries = 0` → the first completion ends the loop
//! - `never_fail = true` → every service uses [`NEVER_FAIL_TIMEOUT`]

use std::time::Duration;

/// Effective timeout of every service in never-fail mode (1000 hours).
pub const NEVER_FAIL_TIMEOUT: Duration = Duration::from_secs(1000 * 60 * 60);

/// Global configuration for the supervisor runtime.
///
/// ## Field semantics
/// - `retries`: restarts allowed across **all** services combined
/// - `never_fail`: replace every service timeout by [`NEVER_FAIL_TIMEOUT`]
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Shared retry budget `R`; the loop observes at most `R + 1` completions.
    pub retries: u32,

    /// Never-fail ("clean") mode: services only end when cancelled.
    ///
    /// With this set the loop can only end through the shutdown source and
    /// the retry budget is never exercised.
    pub never_fail: bool,

    /// Capacity of the event bus broadcast channel.
    ///
    /// A listener that falls more than `bus_capacity` events behind skips the
    /// oldest ones.
    pub bus_capacity: usize,
}

impl SupervisorConfig {
    /// Returns the timeout a service configured with `timeout` actually runs with.
    #[inline]
    pub fn effective_timeout(&self, timeout: Duration) -> Duration {
        if self.never_fail {
            NEVER_FAIL_TIMEOUT
        } else {
            timeout
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `retries = 2`
    /// - `never_fail = false`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            retries: 2,
            never_fail: false,
            bus_capacity: 1024,
        }
    }
}
