//! Sliding window of issuance attempts for one rate limit key.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Attempt recorded; `remaining` more fit in the current window
    Allowed { remaining: u32 },
    /// Attempt refused and not recorded
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed { .. })
    }

    /// Whole minutes until the next attempt is admitted, rounded up, at least 1
    pub fn retry_after_minutes(&self) -> Option<i64> {
        match self {
            Admission::Allowed { .. } => None,
            Admission::Denied { retry_after } => Some(retry_after_minutes(*retry_after)),
        }
    }
}

/// Rounds a retry-after duration up to whole minutes, never below 1
pub fn retry_after_minutes(retry_after: Duration) -> i64 {
    let secs = retry_after.num_seconds().max(0);
    ((secs + 59) / 60).max(1)
}

/// Timestamps of admitted attempts, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitWindow {
    attempts: VecDeque<DateTime<Utc>>,
}

impl RateLimitWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops attempts that fell out of the window ending at `now`
    pub fn prune(&mut self, now: DateTime<Utc>, window: Duration) {
        let cutoff = now - window;
        while let Some(oldest) = self.attempts.front() {
            if *oldest <= cutoff {
                self.attempts.pop_front();
            } else {
                break;
            }
        }
    }

    /// Checks and records one attempt
    ///
    /// A denied attempt does not count toward the limit.
    pub fn admit(&mut self, now: DateTime<Utc>, limit: u32, window: Duration) -> Admission {
        self.prune(now, window);

        if self.attempts.len() >= limit as usize {
            let retry_after = match self.attempts.front() {
                Some(oldest) => *oldest + window - now,
                None => window,
            };
            return Admission::Denied { retry_after };
        }

        self.attempts.push_back(now);
        Admission::Allowed {
            remaining: limit.saturating_sub(self.attempts.len() as u32),
        }
    }

    /// Attempts currently counted
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}
