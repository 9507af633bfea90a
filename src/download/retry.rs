//! Bounded retry with a fixed cool-down.
//!
//! Only a failing HTTP status is worth another attempt; every other outcome
//! of a download attempt is final. [`RetryPolicy::decide`] is pure so the
//! loop in [`fetch_pdf`](super::fetch_pdf) stays a thin driver around it.
//!
//! # Example
//!
//! ```
//! use bibfetch_core::download::{RetryDecision, RetryPolicy};
//! use bibfetch_core::Status;
//!
//! let policy = RetryPolicy::default();
//! assert_eq!(
//!     policy.decide(Status::FailingStatusCode, 1),
//!     RetryDecision::Retry { next_attempt: 2 }
//! );
//! assert_eq!(policy.decide(Status::FailingStatusCode, 3), RetryDecision::Stop);
//! assert_eq!(policy.decide(Status::InvalidLink, 1), RetryDecision::Stop);
//! ```

use std::time::Duration;

use tracing::debug;

use crate::status::Status;

/// Default number of download attempts per record.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default wait before every attempt but the first.
pub const DEFAULT_COOL_DOWN: Duration = Duration::from_secs(5);

/// What to do after an attempt ended with a given status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Cool down, then make attempt `next_attempt` (1-indexed).
    Retry { next_attempt: u32 },
    /// The status is terminal.
    Stop,
}

/// Attempt budget and cool-down between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    cool_down: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cool_down: DEFAULT_COOL_DOWN,
        }
    }
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    #[must_use]
    pub fn new(max_attempts: u32, cool_down: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            cool_down,
        }
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn cool_down(&self) -> Duration {
        self.cool_down
    }

    /// Decides whether attempt `attempt` (1-indexed), which ended in
    /// `status`, is followed by another one.
    #[must_use]
    pub fn decide(&self, status: Status, attempt: u32) -> RetryDecision {
        if status != Status::FailingStatusCode {
            return RetryDecision::Stop;
        }
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::Stop;
        }
        RetryDecision::Retry {
            next_attempt: attempt + 1,
        }
    }
}
