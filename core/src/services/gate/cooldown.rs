//! Resend cooldown for the "send code" control

use chrono::{DateTime, Duration, Utc};

/// Disables resending for a fixed interval after each send
///
/// Independent of the server's rate limiter; a client may be allowed to
/// resend here and still be refused by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResendCooldown {
    interval: Duration,
    available_at: Option<DateTime<Utc>>,
}

impl ResendCooldown {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            available_at: None,
        }
    }

    /// Starts the cooldown after a send at `now`
    pub fn record_send(&mut self, now: DateTime<Utc>) {
        self.available_at = Some(now + self.interval);
    }

    /// Seeds the cooldown from the server's `resendAfterSeconds`
    pub fn seed_from_server(&mut self, now: DateTime<Utc>, resend_after_seconds: u64) {
        let secs = i64::try_from(resend_after_seconds).unwrap_or(i64::MAX / 1_000);
        self.available_at = Some(now + Duration::seconds(secs));
    }

    pub fn can_resend(&self, now: DateTime<Utc>) -> bool {
        match self.available_at {
            Some(at) => now >= at,
            None => true,
        }
    }

    /// Time left before resending is allowed, zero when allowed
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.available_at {
            Some(at) if at > now => at - now,
            _ => Duration::zero(),
        }
    }

    /// Remaining time in whole seconds, rounded up for display
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> u64 {
        let ms = self.remaining(now).num_milliseconds().max(0) as u64;
        ms.div_ceil(1000)
    }

    pub fn reset(&mut self) {
        self.available_at = None;
    }
}
