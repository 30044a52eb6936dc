//! Rate limiting configuration module

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{check_duration, env_parse, ConfigError};

/// Which request attribute issuance is throttled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitKey {
    /// The email address the code is delivered to
    Destination,
    /// The caller's IP address (falls back to the destination when unknown)
    ClientIp,
}

impl FromStr for RateLimitKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "destination" | "email" => Ok(RateLimitKey::Destination),
            "ip" | "client_ip" => Ok(RateLimitKey::ClientIp),
            _ => Err(format!("Invalid rate limit key: {}", s)),
        }
    }
}

/// Issuance rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Max issuance attempts per key inside the window
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Sliding window length in seconds
    #[serde(default = "default_window")]
    pub window_seconds: u64,

    /// Attribute used as the rate limit key
    #[serde(default = "default_key")]
    pub key: RateLimitKey,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_seconds: default_window(),
            key: default_key(),
        }
    }
}

impl RateLimitConfig {
    pub(crate) fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_parse("RATE_LIMIT_MAX_ATTEMPTS")? {
            self.max_attempts = v;
        }
        if let Some(v) = env_parse("RATE_LIMIT_WINDOW_SECONDS")? {
            self.window_seconds = v;
        }
        if let Some(v) = env_parse("RATE_LIMIT_KEY")? {
            self.key = v;
        }
        Ok(())
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "rate limit max_attempts must be greater than zero".to_string(),
            });
        }
        check_duration("rate_limit window_seconds", self.window_seconds)
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_window() -> u64 {
    900 // 15 minutes
}

fn default_key() -> RateLimitKey {
    RateLimitKey::Destination
}
