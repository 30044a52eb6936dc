//! # Infrastructure Layer
//!
//! Concrete implementations of the seams `hk_core` defines for the
//! verification service.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Memory**: process-local code store and rate limiter built on `DashMap`
//! - **Cache**: Redis client, code store and sliding-window rate limiter
//! - **Email**: transactional email over HTTP, plus a logging mock
//!
//! ## Features
//!
//! - `redis-cache`: Enable the Redis backend (default)

use std::sync::Arc;

use hk_core::{CodeStore, EmailSender, RateLimiter};
use hk_shared::config::{AppConfig, StoreBackend};

/// Cache module - Redis client and Redis-backed stores
#[cfg(feature = "redis-cache")]
pub mod cache;

/// Email delivery module
pub mod email;

/// In-memory backends
pub mod memory;

#[cfg(feature = "redis-cache")]
use cache::{RedisClient, RedisCodeStore, RedisRateLimiter};

pub use email::{create_email_sender, HttpEmailSender, MockEmailSender};
pub use memory::{InMemoryCodeStore, InMemoryRateLimiter};

/// Backends selected by configuration
#[derive(Clone)]
pub struct InfrastructureServices {
    pub code_store: Arc<dyn CodeStore>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub email_sender: Arc<dyn EmailSender>,
    #[cfg(feature = "redis-cache")]
    redis: Option<Arc<RedisClient>>,
}

impl InfrastructureServices {
    /// Assemble services from already-built backends
    pub fn new(
        code_store: Arc<dyn CodeStore>,
        rate_limiter: Arc<dyn RateLimiter>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            code_store,
            rate_limiter,
            email_sender,
            #[cfg(feature = "redis-cache")]
            redis: None,
        }
    }

    /// Backend the code store runs on
    pub fn backend(&self) -> StoreBackend {
        #[cfg(feature = "redis-cache")]
        {
            if self.redis.is_some() {
                return StoreBackend::Redis;
            }
        }
        StoreBackend::Memory
    }

    /// Check connectivity of the storage backend
    pub async fn health_check(&self) -> bool {
        #[cfg(feature = "redis-cache")]
        {
            if let Some(redis) = &self.redis {
                return matches!(redis.health_check().await, Ok(true));
            }
        }
        true
    }
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The code store and rate limiter for the configured backend
/// - The Redis connection when the Redis backend is selected
/// - The email sender for the configured provider
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        backend = ?config.cache.backend,
        email_provider = ?config.email.provider,
        "Initializing infrastructure services..."
    );

    let email_sender = create_email_sender(&config.email)?;

    let services = match config.cache.backend {
        StoreBackend::Memory => {
            tracing::warn!(
                "Using in-memory verification store; codes are lost on restart and not shared between instances"
            );
            InfrastructureServices::new(
                Arc::new(InMemoryCodeStore::new()),
                Arc::new(InMemoryRateLimiter::new(&config.rate_limit)),
                email_sender,
            )
        }
        #[cfg(feature = "redis-cache")]
        StoreBackend::Redis => {
            let redis = Arc::new(RedisClient::new(&config.cache).await?);
            let grace = chrono::Duration::seconds(
                i64::try_from(config.verification.used_grace_seconds).unwrap_or(i64::MAX / 1_000),
            );
            InfrastructureServices {
                code_store: Arc::new(RedisCodeStore::new(
                    Arc::clone(&redis),
                    &config.cache.key_prefix,
                    grace,
                )),
                rate_limiter: Arc::new(RedisRateLimiter::new(
                    Arc::clone(&redis),
                    &config.cache.key_prefix,
                    &config.rate_limit,
                )),
                email_sender,
                redis: Some(redis),
            }
        }
        #[cfg(not(feature = "redis-cache"))]
        StoreBackend::Redis => {
            return Err(InfrastructureError::Config(
                "STORE_BACKEND=redis requires the redis-cache feature".to_string(),
            ));
        }
    };

    tracing::info!("Infrastructure services initialized successfully");

    Ok(services)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[cfg(feature = "redis-cache")]
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stored or received payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Email service error
    #[error("Email service error: {0}")]
    Email(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
