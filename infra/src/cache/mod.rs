//! Cache module for Redis-backed verification state
//!
//! Redis makes records and rate limit windows visible to every instance of
//! the service, which the in-memory backend cannot.

pub mod code_store;
pub mod rate_limiter;
pub mod redis_client;

pub use code_store::RedisCodeStore;
pub use rate_limiter::RedisRateLimiter;
pub use redis_client::RedisClient;

use sha2::{Digest, Sha256};

/// Hash a key component so raw identifiers and addresses never appear in Redis keys
pub(crate) fn hash_key_component(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(hasher.finalize())
}
