//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical business areas:
//! - `cache` - Storage backend selection and Redis configuration
//! - `email` - Email delivery provider configuration
//! - `environment` - Environment detection and logging configuration
//! - `rate_limit` - Issuance rate limiting
//! - `server` - HTTP server and CORS configuration
//! - `verification` - Verification code lifetime, grace window and sweeping

pub mod cache;
pub mod email;
pub mod environment;
pub mod rate_limit;
pub mod server;
pub mod verification;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

// Re-export commonly used types
pub use cache::{CacheConfig, StoreBackend};
pub use email::{EmailConfig, EmailProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use rate_limit::{RateLimitConfig, RateLimitKey};
pub use server::{CorsConfig, ServerConfig};
pub use verification::VerificationConfig;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required setting: {key}")]
    Missing { key: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Verification code lifecycle configuration
    pub verification: VerificationConfig,

    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,

    /// Email delivery configuration
    pub email: EmailConfig,

    /// Storage backend configuration
    pub cache: CacheConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            verification: VerificationConfig::default(),
            rate_limit: RateLimitConfig::default(),
            email: EmailConfig::default(),
            cache: CacheConfig::default(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::new("127.0.0.1", 8080),
            cors: CorsConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
            ..Default::default()
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig::new("0.0.0.0", 8080),
            email: EmailConfig {
                provider: EmailProvider::Http,
                ..Default::default()
            },
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
            ..Default::default()
        }
    }

    /// Load configuration from environment
    ///
    /// Starts from the preset for the detected environment and applies every
    /// recognised variable on top of it. A `.env` file is honoured when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        config.server.apply_env()?;
        config.verification.apply_env()?;
        config.rate_limit.apply_env()?;
        config.email.apply_env()?;
        config.cache.apply_env()?;
        config.cors.apply_env();
        config.logging.apply_env()?;

        Ok(config)
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.verification.validate()?;
        self.rate_limit.validate()?;
        self.email.validate()?;
        Ok(())
    }
}

/// Upper bound for every lifetime, window, cooldown and interval setting
pub const MAX_DURATION_SECONDS: u64 = 86_400;

/// Reject a duration setting that is zero or longer than one day
pub(crate) fn check_duration(name: &str, seconds: u64) -> Result<(), ConfigError> {
    if seconds == 0 || seconds > MAX_DURATION_SECONDS {
        return Err(ConfigError::Invalid {
            message: format!(
                "{} must be between 1 and {} seconds, got {}",
                name, MAX_DURATION_SECONDS, seconds
            ),
        });
    }
    Ok(())
}

/// Read and parse an optional environment variable
///
/// Unset variables yield `Ok(None)`; set but unparsable ones are an error
/// rather than being silently replaced by a default.
pub(crate) fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}

/// Read an optional, non-empty string environment variable
pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
