//! Verification code lifecycle configuration module

use serde::{Deserialize, Serialize};

use super::{check_duration, env_parse, ConfigError};

/// Verification code lifetime, retention and cleanup settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Seconds a freshly issued code stays valid
    #[serde(default = "default_code_ttl")]
    pub code_ttl_seconds: u64,

    /// Seconds a used record is retained so duplicate submissions see "already used"
    #[serde(default = "default_used_grace")]
    pub used_grace_seconds: u64,

    /// Interval between sweeper passes in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Client-side resend cooldown advertised to callers, in seconds
    #[serde(default = "default_resend_cooldown")]
    pub resend_cooldown_seconds: u64,

    /// Optional cap on mismatched submissions per code (disabled when `None`)
    #[serde(default)]
    pub verify_max_attempts: Option<u32>,

    /// Product name used in the email subject and body
    #[serde(default = "default_app_name")]
    pub app_name: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: default_code_ttl(),
            used_grace_seconds: default_used_grace(),
            sweep_interval_seconds: default_sweep_interval(),
            resend_cooldown_seconds: default_resend_cooldown(),
            verify_max_attempts: None,
            app_name: default_app_name(),
        }
    }
}

impl VerificationConfig {
    pub(crate) fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_parse("CODE_TTL_SECONDS")? {
            self.code_ttl_seconds = v;
        }
        if let Some(v) = env_parse("USED_GRACE_SECONDS")? {
            self.used_grace_seconds = v;
        }
        if let Some(v) = env_parse("SWEEP_INTERVAL_SECONDS")? {
            self.sweep_interval_seconds = v;
        }
        if let Some(v) = env_parse("RESEND_COOLDOWN_SECONDS")? {
            self.resend_cooldown_seconds = v;
        }
        if let Some(v) = env_parse::<u32>("VERIFY_MAX_ATTEMPTS")? {
            self.verify_max_attempts = if v == 0 { None } else { Some(v) };
        }
        if let Some(v) = super::env_string("APP_NAME") {
            self.app_name = v;
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        check_duration("code_ttl_seconds", self.code_ttl_seconds)?;
        check_duration("sweep_interval_seconds", self.sweep_interval_seconds)?;
        // Zero is allowed for these two: no cooldown, and no used-record grace
        if self.resend_cooldown_seconds > 0 {
            check_duration("resend_cooldown_seconds", self.resend_cooldown_seconds)?;
        }
        if self.used_grace_seconds > 0 {
            check_duration("used_grace_seconds", self.used_grace_seconds)?;
        }
        Ok(())
    }
}

fn default_code_ttl() -> u64 {
    300 // 5 minutes
}

fn default_used_grace() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    300 // 5 minutes
}

fn default_resend_cooldown() -> u64 {
    60
}

fn default_app_name() -> String {
    String::from("HomeKeep")
}
