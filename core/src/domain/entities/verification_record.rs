//! Verification record entity for email-delivered two-factor codes.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Smallest code that can be issued (no leading zeros)
pub const CODE_MIN: u32 = 100_000;

/// Largest code that can be issued
pub const CODE_MAX: u32 = 999_999;

/// Default expiration time for verification codes (5 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 5;

/// Default retention of a used record before it is removed
pub const DEFAULT_GRACE_SECONDS: i64 = 60;

/// A verification code bound to an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    /// Unique id of this issuance; a re-issue for the same identifier gets a new one
    pub id: Uuid,

    /// User id or provisional registration key the code is bound to
    pub identifier: String,

    /// The 6-digit verification code
    pub code: String,

    /// Email address the code was sent to
    pub destination: String,

    /// Timestamp when the code was issued
    pub issued_at: DateTime<Utc>,

    /// Timestamp after which the code is no longer accepted
    pub expires_at: DateTime<Utc>,

    /// Whether the code has been successfully used
    pub used: bool,

    /// When the code was successfully used
    #[serde(default)]
    pub used_at: Option<DateTime<Utc>>,

    /// Number of mismatched submissions against this code
    #[serde(default)]
    pub failed_attempts: u32,
}

impl VerificationRecord {
    /// Issues a new record with a freshly generated code
    ///
    /// # Arguments
    ///
    /// * `identifier` - Key the record is bound to
    /// * `destination` - Email address the code will be delivered to
    /// * `now` - Issuance time
    /// * `ttl` - Validity window starting at `now`
    pub fn issue(
        identifier: impl Into<String>,
        destination: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self::with_code(identifier, destination, Self::generate_code(), now, ttl)
    }

    /// Creates a record around a known code
    pub fn with_code(
        identifier: impl Into<String>,
        destination: impl Into<String>,
        code: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: identifier.into(),
            code: code.into(),
            destination: destination.into(),
            issued_at: now,
            expires_at: now + ttl,
            used: false,
            used_at: None,
            failed_attempts: 0,
        }
    }

    /// Generates a code uniformly distributed over [100000, 999999]
    pub fn generate_code() -> String {
        let code: u32 = OsRng.gen_range(CODE_MIN..=CODE_MAX);
        code.to_string()
    }

    /// Whether the code is past its expiry at `now`
    ///
    /// The boundary instant itself is still valid.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// A live record is neither used nor expired
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && !self.is_expired_at(now)
    }

    /// Whether a used record has outlived its retention grace window
    pub fn grace_elapsed_at(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        match self.used_at {
            Some(used_at) => now > used_at + grace,
            None => false,
        }
    }

    /// Whether a cleanup pass may delete this record
    pub fn is_purgeable_at(&self, now: DateTime<Utc>, grace: Duration) -> bool {
        self.is_expired_at(now) || self.grace_elapsed_at(now, grace)
    }

    /// Compares a submitted code in constant time
    ///
    /// Surrounding whitespace is ignored; nothing else is normalized.
    pub fn matches(&self, submitted: &str) -> bool {
        constant_time_eq(self.code.as_bytes(), submitted.trim().as_bytes())
    }

    /// Marks the record as used
    pub fn mark_used(&mut self, now: DateTime<Utc>) {
        self.used = true;
        self.used_at = Some(now);
    }

    /// Records a mismatched submission and returns the new count
    pub fn record_failed_attempt(&mut self) -> u32 {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        self.failed_attempts
    }

    /// Time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self, now: DateTime<Utc>) -> Duration {
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}
