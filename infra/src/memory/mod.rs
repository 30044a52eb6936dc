//! In-memory code store and rate limiter
//!
//! State lives in process-wide concurrent maps. Nothing survives a restart
//! and nothing is shared between instances; use the Redis backend for that.

mod code_store;
mod rate_limiter;

pub use code_store::InMemoryCodeStore;
pub use rate_limiter::InMemoryRateLimiter;
