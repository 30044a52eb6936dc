//! DashMap-backed sliding window rate limiter

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;

use hk_core::{bounded_seconds, Admission, Clock, RateLimitWindow, RateLimiter, SystemClock};
use hk_shared::config::RateLimitConfig;

/// Per-key attempt windows
///
/// The DashMap entry lock makes prune, check and record one atomic step per
/// key; different keys never contend on the same entry.
#[derive(Debug)]
pub struct InMemoryRateLimiter {
    windows: DashMap<String, RateLimitWindow>,
    limit: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            limit: config.max_attempts,
            window: bounded_seconds(config.window_seconds),
            clock,
        }
    }

    /// Drops keys whose windows have fully aged out, returning how many
    pub fn prune_idle(&self) -> usize {
        let now = self.clock.now();
        let before = self.windows.len();
        self.windows.retain(|_, w| {
            w.prune(now, self.window);
            !w.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Keys currently tracked
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn admit(&self, key: &str) -> Result<Admission, String> {
        let key = key.trim().to_lowercase();
        let now = self.clock.now();

        let mut window = self.windows.entry(key).or_default();
        Ok(window.admit(now, self.limit, self.window))
    }

    async fn prune(&self) -> Result<usize, String> {
        Ok(self.prune_idle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hk_core::ManualClock;

    fn limiter() -> (InMemoryRateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let limiter = InMemoryRateLimiter::with_clock(&RateLimitConfig::default(), clock.clone());
        (limiter, clock)
    }

    #[tokio::test]
    async fn test_three_allowed_then_denied() {
        let (limiter, _clock) = limiter();

        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                limiter.admit("a@x.com").await.unwrap(),
                Admission::Allowed {
                    remaining: expected_remaining
                }
            );
        }
        assert!(!limiter.admit("a@x.com").await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_keys_are_normalized() {
        let (limiter, _clock) = limiter();

        limiter.admit("a@x.com").await.unwrap();
        limiter.admit(" A@X.COM ").await.unwrap();
        limiter.admit("a@X.com").await.unwrap();

        assert_eq!(limiter.tracked_keys(), 1);
        assert!(!limiter.admit("a@x.com").await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_denied_attempts_are_not_recorded() {
        let (limiter, clock) = limiter();

        for _ in 0..3 {
            limiter.admit("a@x.com").await.unwrap();
        }
        for _ in 0..5 {
            clock.advance(Duration::minutes(1));
            assert!(!limiter.admit("a@x.com").await.unwrap().is_allowed());
        }

        // Only the three admitted attempts age out
        clock.advance(Duration::minutes(10));
        assert!(limiter.admit("a@x.com").await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_prune_idle_drops_aged_out_keys() {
        let (limiter, clock) = limiter();

        limiter.admit("a@x.com").await.unwrap();
        limiter.admit("b@x.com").await.unwrap();
        clock.advance(Duration::minutes(10));
        limiter.admit("c@x.com").await.unwrap();
        clock.advance(Duration::minutes(6));

        assert_eq!(limiter.prune_idle(), 2);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[tokio::test]
    async fn test_trait_prune_keeps_live_windows() {
        let (limiter, clock) = limiter();

        limiter.admit("a@x.com").await.unwrap();
        clock.advance(Duration::minutes(14));
        assert_eq!(RateLimiter::prune(&limiter).await.unwrap(), 0);

        clock.advance(Duration::minutes(2));
        assert_eq!(RateLimiter::prune(&limiter).await.unwrap(), 1);
        assert_eq!(limiter.tracked_keys(), 0);
    }
}
