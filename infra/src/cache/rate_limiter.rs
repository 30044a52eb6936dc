//! Redis-based sliding window rate limiter
//!
//! Each key is a sorted set of attempt timestamps (milliseconds). Pruning,
//! the optimistic add and the count run as one MULTI/EXEC transaction; an
//! add that overflows the window is removed again and reported as denied.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use hk_core::{Admission, RateLimiter};
use hk_shared::config::RateLimitConfig;

use super::{hash_key_component, RedisClient};
use crate::InfrastructureError;

pub struct RedisRateLimiter {
    client: Arc<RedisClient>,
    key_prefix: String,
    limit: u32,
    window_ms: i64,
}

impl RedisRateLimiter {
    pub fn new(client: Arc<RedisClient>, key_prefix: &str, config: &RateLimitConfig) -> Self {
        Self {
            client,
            key_prefix: key_prefix.to_string(),
            limit: config.max_attempts,
            window_ms: i64::try_from(config.window_seconds)
                .unwrap_or(i64::MAX / 1_000)
                .saturating_mul(1_000),
        }
    }

    fn key(&self, key: &str) -> String {
        let normalized = key.trim().to_lowercase();
        format!("{}:2fa:rate:{}", self.key_prefix, hash_key_component(&normalized))
    }

    async fn check_and_record(&self, key: &str) -> Result<Admission, InfrastructureError> {
        let mut conn = self.client.get_connection();

        let now = Utc::now().timestamp_millis();
        let window_start = now - self.window_ms;
        let member = format!("{}-{}", now, Uuid::new_v4());

        let (count, oldest): (u64, Vec<(String, f64)>) = redis::pipe()
            .atomic()
            .cmd("ZREMRANGEBYSCORE")
            .arg(key)
            .arg("-inf")
            .arg(window_start)
            .ignore()
            .cmd("ZADD")
            .arg(key)
            .arg(now)
            .arg(&member)
            .ignore()
            .cmd("ZCARD")
            .arg(key)
            .cmd("ZRANGE")
            .arg(key)
            .arg(0)
            .arg(0)
            .arg("WITHSCORES")
            .query_async(&mut conn)
            .await?;

        if count > u64::from(self.limit) {
            redis::cmd("ZREM")
                .arg(key)
                .arg(&member)
                .query_async::<_, i64>(&mut conn)
                .await?;

            let retry_after_ms = match oldest.first() {
                Some((_, score)) => (*score as i64 + self.window_ms - now).max(0),
                None => self.window_ms,
            };
            return Ok(Admission::Denied {
                retry_after: Duration::milliseconds(retry_after_ms),
            });
        }

        redis::cmd("PEXPIRE")
            .arg(key)
            .arg(self.window_ms)
            .query_async::<_, i64>(&mut conn)
            .await?;

        Ok(Admission::Allowed {
            remaining: self.limit.saturating_sub(count as u32),
        })
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn admit(&self, key: &str) -> Result<Admission, String> {
        let redis_key = self.key(key);
        self.check_and_record(&redis_key).await.map_err(|e| {
            tracing::error!(error = %e, "Redis rate limit check failed");
            e.to_string()
        })
    }
}
