//! Shared utilities and common types for the HomeKeep server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and environment loaders
//! - API response envelopes
//! - Email address utilities (validation, normalization, masking)

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheConfig, ConfigError, CorsConfig, EmailConfig, EmailProvider, Environment,
    LogFormat, LoggingConfig, RateLimitConfig, RateLimitKey, ServerConfig, StoreBackend,
    VerificationConfig,
};
pub use types::{ApiResponse, HealthResponse, HealthStatus};
pub use utils::email;
