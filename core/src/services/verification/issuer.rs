//! Code issuance: rate limit, generate, store, deliver

use std::sync::Arc;

use hk_shared::config::RateLimitKey;
use hk_shared::utils::email::{is_valid_email, mask_email, normalize_email};

use crate::domain::entities::{Admission, VerificationRecord};
use crate::errors::{VerificationError, VerificationResult};
use crate::services::clock::Clock;

use super::config::VerificationServiceConfig;
use super::locks::KeyedLocks;
use super::message::render_code_email;
use super::traits::{CodeStore, EmailSender, RateLimiter};
use super::types::{IssueRequest, IssuedCode};

/// Issues verification codes and hands them to the email collaborator
pub struct Issuer {
    store: Arc<dyn CodeStore>,
    rate_limiter: Arc<dyn RateLimiter>,
    email: Arc<dyn EmailSender>,
    locks: Arc<KeyedLocks>,
    clock: Arc<dyn Clock>,
    config: VerificationServiceConfig,
}

impl Issuer {
    pub fn new(
        store: Arc<dyn CodeStore>,
        rate_limiter: Arc<dyn RateLimiter>,
        email: Arc<dyn EmailSender>,
        locks: Arc<KeyedLocks>,
        clock: Arc<dyn Clock>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            store,
            rate_limiter,
            email,
            locks,
            clock,
            config,
        }
    }

    /// Issue a code for an identifier and send it to the destination
    ///
    /// This method:
    /// 1. Validates the identifier and destination address
    /// 2. Consults the rate limiter; a denial creates no record
    /// 3. Generates a code and stores it, replacing any previous record
    /// 4. Sends the code by email, outside the per-identifier lock
    ///
    /// A delivery failure leaves the stored record in place.
    pub async fn issue(&self, request: IssueRequest) -> VerificationResult<IssuedCode> {
        let identifier = request.identifier.trim();
        if identifier.is_empty() {
            return Err(VerificationError::validation("userId", "must not be empty"));
        }

        let destination = normalize_email(&request.destination);
        if destination.is_empty() {
            return Err(VerificationError::validation("email", "must not be empty"));
        }
        if !is_valid_email(&destination) {
            return Err(VerificationError::validation(
                "email",
                "must be a valid email address",
            ));
        }

        let rate_key = self.rate_limit_key(&destination, request.client_ip.as_deref());
        let admission = self.rate_limiter.admit(&rate_key).await.map_err(|e| {
            tracing::error!(
                identifier = identifier,
                error = %e,
                event = "rate_limiter_unavailable",
                "Rate limiter failed"
            );
            VerificationError::store(e)
        })?;

        let remaining_attempts = match admission {
            Admission::Allowed { remaining } => remaining,
            Admission::Denied { retry_after } => {
                let retry_after_secs =
                    u64::try_from(retry_after.num_milliseconds()).unwrap_or(0).div_ceil(1000);
                tracing::warn!(
                    identifier = identifier,
                    destination = %mask_email(&destination),
                    retry_after_secs = retry_after_secs,
                    event = "rate_limit_exceeded",
                    "Verification code request rate limit exceeded"
                );
                return Err(VerificationError::RateLimited { retry_after_secs });
            }
        };

        let now = self.clock.now();
        let record = VerificationRecord::issue(identifier, &destination, now, self.config.code_ttl);

        {
            let _guard = self.locks.lock(identifier).await;
            self.store.put(&record).await.map_err(|e| {
                tracing::error!(
                    identifier = identifier,
                    error = %e,
                    event = "otp_store_failed",
                    "Failed to store verification code"
                );
                VerificationError::store(e)
            })?;
        }

        tracing::info!(
            identifier = identifier,
            destination = %mask_email(&destination),
            record_id = %record.id,
            expires_at = %record.expires_at,
            event = "otp_generated",
            "Verification code generated"
        );

        let message =
            render_code_email(&self.config.app_name, &destination, &record.code, self.config.code_ttl);

        let message_id =
            match tokio::time::timeout(self.config.dispatch_timeout, self.email.send_email(&message))
                .await
            {
                Ok(Ok(message_id)) => message_id,
                Ok(Err(e)) => {
                    tracing::error!(
                        identifier = identifier,
                        destination = %mask_email(&destination),
                        provider = self.email.provider_name(),
                        error = %e,
                        event = "otp_delivery_failed",
                        "Failed to send verification email"
                    );
                    return Err(VerificationError::DeliveryFailed { reason: e });
                }
                Err(_) => {
                    tracing::error!(
                        identifier = identifier,
                        destination = %mask_email(&destination),
                        provider = self.email.provider_name(),
                        timeout_ms = self.config.dispatch_timeout.as_millis() as u64,
                        event = "otp_delivery_timeout",
                        "Verification email dispatch timed out"
                    );
                    return Err(VerificationError::DeliveryFailed {
                        reason: format!(
                            "email dispatch timed out after {}s",
                            self.config.dispatch_timeout.as_secs()
                        ),
                    });
                }
            };

        tracing::info!(
            identifier = identifier,
            destination = %mask_email(&destination),
            provider = self.email.provider_name(),
            message_id = %message_id,
            event = "otp_sent",
            "Verification email sent"
        );

        Ok(IssuedCode {
            record_id: record.id,
            code: record.code,
            expires_at: record.expires_at,
            message_id,
            resend_available_at: now + self.config.resend_cooldown,
            remaining_attempts,
        })
    }

    /// Rate limit key for a request; falls back to the destination when no IP is known
    fn rate_limit_key(&self, destination: &str, client_ip: Option<&str>) -> String {
        match (self.config.rate_limit_key, client_ip) {
            (RateLimitKey::ClientIp, Some(ip)) if !ip.trim().is_empty() => {
                format!("ip:{}", ip.trim().to_lowercase())
            }
            _ => format!("email:{}", destination),
        }
    }
}
