//! Storage backend configuration module

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{env_parse, env_string, ConfigError};

/// Where verification records and rate limit windows live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local maps; state is lost on restart and not shared between instances
    Memory,
    /// Redis; required for multi-instance deployments
    Redis,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "in-memory" => Ok(StoreBackend::Memory),
            "redis" => Ok(StoreBackend::Redis),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

/// Storage backend and Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Backend selection
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Redis connection URL
    #[serde(default = "default_url")]
    pub url: String,

    /// Prefix prepended to every Redis key
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Maximum retry attempts for transient Redis failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay in milliseconds
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_url(),
            key_prefix: default_key_prefix(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub(crate) fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(v) = env_parse("STORE_BACKEND")? {
            self.backend = v;
        }
        if let Some(v) = env_string("REDIS_URL") {
            self.url = v;
        }
        if let Some(v) = env_string("REDIS_KEY_PREFIX") {
            self.key_prefix = v;
        }
        Ok(())
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_url() -> String {
    String::from("redis://localhost:6379")
}

fn default_key_prefix() -> String {
    String::from("hk")
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    100
}
