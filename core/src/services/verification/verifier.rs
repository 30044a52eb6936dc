//! Code verification and single-use consumption

use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{VerificationError, VerificationResult};
use crate::services::clock::Clock;

use super::config::VerificationServiceConfig;
use super::locks::KeyedLocks;
use super::traits::CodeStore;
use super::types::VerifiedCode;

/// Checks submitted codes against stored records
pub struct Verifier {
    store: Arc<dyn CodeStore>,
    locks: Arc<KeyedLocks>,
    clock: Arc<dyn Clock>,
    config: VerificationServiceConfig,
}

impl Verifier {
    pub fn new(
        store: Arc<dyn CodeStore>,
        locks: Arc<KeyedLocks>,
        clock: Arc<dyn Clock>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            store,
            locks,
            clock,
            config,
        }
    }

    /// Verify a submitted code for an identifier
    ///
    /// Outcomes are checked in order: missing record, already used, expired,
    /// mismatch, match. A match marks the record used and schedules its
    /// removal after the grace window.
    ///
    /// # Returns
    ///
    /// * `Ok(VerifiedCode)` - The code matched and is now consumed
    /// * `Err(VerificationError)` - `NotFound`, `AlreadyUsed`, `Expired`,
    ///   `Mismatch`, `AttemptsExceeded` or a store failure
    pub async fn verify(&self, identifier: &str, submitted: &str) -> VerificationResult<VerifiedCode> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(VerificationError::validation("userId", "must not be empty"));
        }
        let submitted = submitted.trim();

        let guard = self.locks.lock(identifier).await;
        let now = self.clock.now();

        let mut record = match self.store.get(identifier).await.map_err(store_error)? {
            Some(record) => record,
            None => {
                tracing::debug!(identifier = identifier, event = "otp_not_found", "No verification code");
                return Err(VerificationError::NotFound);
            }
        };

        if record.used {
            if record.grace_elapsed_at(now, self.config.used_grace) {
                self.store.delete(identifier).await.map_err(store_error)?;
                return Err(VerificationError::NotFound);
            }
            tracing::info!(
                identifier = identifier,
                event = "otp_already_used",
                "Verification code already used"
            );
            return Err(VerificationError::AlreadyUsed);
        }

        if record.is_expired_at(now) {
            self.store.delete(identifier).await.map_err(store_error)?;
            tracing::info!(
                identifier = identifier,
                expired_at = %record.expires_at,
                event = "otp_expired",
                "Verification code expired"
            );
            return Err(VerificationError::Expired);
        }

        if !record.matches(submitted) {
            if let Some(max_attempts) = self.config.verify_max_attempts {
                let attempts = record.record_failed_attempt();
                if attempts >= max_attempts {
                    self.store.delete(identifier).await.map_err(store_error)?;
                    tracing::warn!(
                        identifier = identifier,
                        attempts = attempts,
                        event = "otp_attempts_exceeded",
                        "Verification code invalidated after too many mismatches"
                    );
                    return Err(VerificationError::AttemptsExceeded);
                }
                self.store.put(&record).await.map_err(store_error)?;
            }
            tracing::warn!(
                identifier = identifier,
                failed_attempts = record.failed_attempts,
                event = "otp_mismatch",
                "Verification code mismatch"
            );
            return Err(VerificationError::Mismatch);
        }

        record.mark_used(now);
        self.store.put(&record).await.map_err(store_error)?;
        drop(guard);

        tracing::info!(
            identifier = identifier,
            record_id = %record.id,
            event = "otp_verified",
            "Verification code verified"
        );

        self.schedule_grace_deletion(identifier.to_string(), record.id);

        Ok(VerifiedCode {
            identifier: identifier.to_string(),
            record_id: record.id,
            verified_at: now,
        })
    }

    /// Deletes the used record once the grace window has passed
    ///
    /// Only the same used record is removed; a code re-issued in the meantime
    /// has a different id and is left alone. Without a runtime the record is
    /// left to lazy deletion and the sweeper.
    fn schedule_grace_deletion(&self, identifier: String, record_id: Uuid) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let Ok(grace) = self.config.used_grace.to_std() else {
            return;
        };

        let store = Arc::clone(&self.store);
        let locks = Arc::clone(&self.locks);

        handle.spawn(async move {
            tokio::time::sleep(grace).await;

            let _guard = locks.lock(&identifier).await;
            match store.get(&identifier).await {
                Ok(Some(record)) if record.id == record_id && record.used => {
                    if let Err(e) = store.delete(&identifier).await {
                        tracing::warn!(
                            identifier = %identifier,
                            error = %e,
                            event = "otp_grace_delete_failed",
                            "Failed to delete used verification code"
                        );
                    } else {
                        tracing::debug!(
                            identifier = %identifier,
                            event = "otp_grace_deleted",
                            "Used verification code removed"
                        );
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        identifier = %identifier,
                        error = %e,
                        event = "otp_grace_delete_failed",
                        "Failed to read verification code for grace deletion"
                    );
                }
            }
        });
    }
}

fn store_error(e: String) -> VerificationError {
    tracing::error!(error = %e, event = "otp_store_failed", "Verification store failed");
    VerificationError::store(e)
}
