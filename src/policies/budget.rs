//! # Shared retry budget.
//!
//! [`RetryBudget`] bounds the **total** number of restarts across every
//! supervised service. It is consumed once per completion observed by the
//! restart loop; with `R` retries the loop observes at most `R + 1`
//! completions and restarts after all but the last.
//!
//! The budget is not per service: one flaky service can exhaust it and take
//! otherwise healthy services down with it.
//!
//! ```text
//! R = 2:   consume() → Restart{remaining: 1}
//!          consume() → Restart{remaining: 0}
//!          consume() → Exhausted
//! ```

/// Outcome of consuming one unit of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Restart the completed service; `remaining` retries are left.
    Restart {
        /// Retries left after this one.
        remaining: u32,
    },
    /// The last permitted completion: do not restart, end the loop.
    Exhausted,
}

/// Monotonically decreasing counter shared by all services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    remaining: u32,
}

impl RetryBudget {
    /// Creates a budget allowing `retries` restarts.
    pub fn new(retries: u32) -> Self {
        Self { remaining: retries }
    }

    /// Consumes one completion event.
    pub fn consume(&mut self) -> Verdict {
        match self.remaining.checked_sub(1) {
            Some(left) => {
                self.remaining = left;
                Verdict::Restart { remaining: left }
            }
            None => Verdict::Exhausted,
        }
    }

    /// Retries still available.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}
