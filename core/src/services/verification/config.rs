//! Configuration for the verification service

use chrono::Duration;
use hk_shared::config::{EmailConfig, RateLimitKey, VerificationConfig, MAX_DURATION_SECONDS};

use crate::domain::entities::verification_record::{
    DEFAULT_EXPIRATION_MINUTES, DEFAULT_GRACE_SECONDS,
};

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// How long an issued code stays valid
    pub code_ttl: Duration,
    /// How long a used record is kept so repeats report "already used"
    pub used_grace: Duration,
    /// Interval between sweeper passes
    pub sweep_interval: std::time::Duration,
    /// Client resend cooldown advertised with each issuance
    pub resend_cooldown: Duration,
    /// Optional cap on mismatched submissions per code
    pub verify_max_attempts: Option<u32>,
    /// Attribute issuance is rate limited on
    pub rate_limit_key: RateLimitKey,
    /// Upper bound on a single email dispatch
    pub dispatch_timeout: std::time::Duration,
    /// Product name rendered into the email
    pub app_name: String,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(DEFAULT_EXPIRATION_MINUTES),
            used_grace: Duration::seconds(DEFAULT_GRACE_SECONDS),
            sweep_interval: std::time::Duration::from_secs(300),
            resend_cooldown: Duration::seconds(60),
            verify_max_attempts: None,
            rate_limit_key: RateLimitKey::Destination,
            dispatch_timeout: std::time::Duration::from_secs(10),
            app_name: String::from("HomeKeep"),
        }
    }
}

impl VerificationServiceConfig {
    /// Builds the service configuration from the application settings
    pub fn from_settings(
        verification: &VerificationConfig,
        rate_limit_key: RateLimitKey,
        email: &EmailConfig,
    ) -> Self {
        Self {
            code_ttl: bounded_seconds(verification.code_ttl_seconds),
            used_grace: bounded_seconds(verification.used_grace_seconds),
            sweep_interval: std::time::Duration::from_secs(
                verification.sweep_interval_seconds.min(MAX_DURATION_SECONDS),
            ),
            resend_cooldown: bounded_seconds(verification.resend_cooldown_seconds),
            verify_max_attempts: verification.verify_max_attempts,
            rate_limit_key,
            dispatch_timeout: std::time::Duration::from_secs(
                email.timeout_seconds.min(MAX_DURATION_SECONDS),
            ),
            app_name: verification.app_name.clone(),
        }
    }
}

/// Seconds setting as a `Duration`, capped at one day
///
/// Validation already rejects larger values; the cap keeps timestamp
/// arithmetic from overflowing when a config skips validation.
pub fn bounded_seconds(value: u64) -> Duration {
    i64::try_from(value.min(MAX_DURATION_SECONDS))
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(|| Duration::seconds(86_400))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_settings_defaults() {
        let from_settings = VerificationServiceConfig::from_settings(
            &VerificationConfig::default(),
            RateLimitKey::Destination,
            &EmailConfig::default(),
        );
        let default = VerificationServiceConfig::default();

        assert_eq!(from_settings.code_ttl, default.code_ttl);
        assert_eq!(from_settings.used_grace, default.used_grace);
        assert_eq!(from_settings.sweep_interval, default.sweep_interval);
        assert_eq!(from_settings.resend_cooldown, default.resend_cooldown);
        assert_eq!(from_settings.dispatch_timeout, default.dispatch_timeout);
        assert_eq!(from_settings.verify_max_attempts, None);
    }

    #[test]
    fn test_oversized_settings_are_capped() {
        let verification = VerificationConfig {
            code_ttl_seconds: 10_000_000_000_000,
            used_grace_seconds: u64::MAX,
            sweep_interval_seconds: u64::MAX,
            ..Default::default()
        };
        let config = VerificationServiceConfig::from_settings(
            &verification,
            RateLimitKey::Destination,
            &EmailConfig::default(),
        );

        assert_eq!(config.code_ttl, Duration::days(1));
        assert_eq!(config.used_grace, Duration::days(1));
        assert_eq!(config.sweep_interval, std::time::Duration::from_secs(86_400));
        assert_eq!(bounded_seconds(90), Duration::seconds(90));
    }
}
