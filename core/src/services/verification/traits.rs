//! Traits for storage, rate limiting and email delivery integration
//!
//! Implementations live in `hk_infra`. Errors cross these seams as strings
//! and are mapped into [`crate::errors::VerificationError`] by the services.

use async_trait::async_trait;

use crate::domain::entities::{Admission, VerificationRecord};

use super::types::EmailMessage;

/// Keyed storage of verification records, one record per identifier
#[async_trait]
pub trait CodeStore: Send + Sync {
    /// Get the record for an identifier
    async fn get(&self, identifier: &str) -> Result<Option<VerificationRecord>, String>;
    /// Insert or overwrite the record for its identifier
    async fn put(&self, record: &VerificationRecord) -> Result<(), String>;
    /// Remove the record for an identifier, returning whether one existed
    async fn delete(&self, identifier: &str) -> Result<bool, String>;
    /// Snapshot of all records currently stored
    async fn scan(&self) -> Result<Vec<VerificationRecord>, String>;
}

/// Sliding-window admission control for code issuance
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Check and record one attempt for `key`
    ///
    /// Check and record must be atomic per key. Denied attempts are not recorded.
    async fn admit(&self, key: &str) -> Result<Admission, String>;

    /// Forget keys whose windows hold no live attempts, returning how many
    ///
    /// Called on every sweeper tick. Backends that expire keys on their own
    /// keep the default no-op.
    async fn prune(&self) -> Result<usize, String> {
        Ok(0)
    }
}

/// Trait for email delivery integration
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a message, returning the provider's message id
    async fn send_email(&self, message: &EmailMessage) -> Result<String, String>;
    /// Provider name for logging
    fn provider_name(&self) -> &str;
}
