//! Types for verification service requests and results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Input to code issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// Key the code is bound to (user id or provisional registration key)
    pub identifier: String,
    /// Email address to deliver the code to
    pub destination: String,
    /// Caller IP, used when issuance is rate limited per client
    pub client_ip: Option<String>,
}

impl IssueRequest {
    pub fn new(identifier: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            destination: destination.into(),
            client_ip: None,
        }
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }
}

/// Result of issuing a verification code
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// Id of the stored record
    pub record_id: Uuid,
    /// The generated code
    pub code: String,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
    /// The email message ID from the provider
    pub message_id: String,
    /// When the client may offer a resend
    pub resend_available_at: DateTime<Utc>,
    /// Issuance attempts left in the current rate limit window
    pub remaining_attempts: u32,
}

/// Result of a successful verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedCode {
    pub identifier: String,
    pub record_id: Uuid,
    pub verified_at: DateTime<Utc>,
}

/// Rendered email handed to an [`super::traits::EmailSender`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Counts from one sweeper pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records inspected
    pub scanned: usize,
    /// Records deleted
    pub removed: usize,
    /// Deletions that failed and are left for the next pass
    pub failed: usize,
    /// Idle rate limit keys dropped
    pub pruned_keys: usize,
}
