//! Integration tests for the Redis backend
//!
//! These tests require a running Redis instance to execute.
//! Run with: cargo test -p hk_infra --test redis_integration -- --ignored

#![cfg(feature = "redis-cache")]

use std::sync::Arc;

use chrono::{Duration, Utc};
use hk_core::{Admission, CodeStore, RateLimiter, VerificationRecord};
use hk_infra::cache::{RedisClient, RedisCodeStore, RedisRateLimiter};
use hk_shared::config::{CacheConfig, RateLimitConfig};
use uuid::Uuid;

async fn client() -> Arc<RedisClient> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    Arc::new(RedisClient::new(&CacheConfig::new(url)).await.unwrap())
}

/// Unique prefix so parallel runs never share keys
fn prefix() -> String {
    format!("hk-test-{}", Uuid::new_v4())
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_redis_connection() {
    let client = client().await;
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_code_store_round_trip() {
    let store = RedisCodeStore::new(client().await, &prefix(), Duration::seconds(60));
    let record = VerificationRecord::issue("user1", "a@x.com", Utc::now(), Duration::minutes(5));

    store.put(&record).await.unwrap();
    assert_eq!(store.get("user1").await.unwrap(), Some(record.clone()));
    assert_eq!(store.scan().await.unwrap().len(), 1);

    assert!(store.delete("user1").await.unwrap());
    assert!(!store.delete("user1").await.unwrap());
    assert!(store.get("user1").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis server
async fn test_rate_limiter_denies_fourth_attempt() {
    let limiter = RedisRateLimiter::new(client().await, &prefix(), &RateLimitConfig::default());

    for _ in 0..3 {
        assert!(limiter.admit("email:a@x.com").await.unwrap().is_allowed());
    }

    match limiter.admit("email:a@x.com").await.unwrap() {
        Admission::Denied { retry_after } => {
            assert!(retry_after > Duration::minutes(14));
            assert!(retry_after <= Duration::minutes(15));
        }
        other => panic!("Expected denial, got {:?}", other),
    }

    // Denied attempts are not counted against other keys
    assert!(limiter.admit("email:b@x.com").await.unwrap().is_allowed());
}
