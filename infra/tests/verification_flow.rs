//! End-to-end verification flows over the in-memory backends
//!
//! Wires `VerificationService` to the real store, rate limiter and mock
//! email sender with a manual clock, the way the server assembles them.

use std::sync::Arc;

use chrono::Duration;
use hk_core::{
    Clock, IssueRequest, ManualClock, VerificationError, VerificationService,
    VerificationServiceConfig,
};
use hk_infra::{InMemoryCodeStore, InMemoryRateLimiter, MockEmailSender};
use hk_shared::config::RateLimitConfig;

struct Flow {
    service: VerificationService,
    store: Arc<InMemoryCodeStore>,
    rate_limiter: Arc<InMemoryRateLimiter>,
    email: MockEmailSender,
    clock: Arc<ManualClock>,
}

fn flow() -> Flow {
    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(InMemoryCodeStore::new());
    let rate_limiter = Arc::new(InMemoryRateLimiter::with_clock(
        &RateLimitConfig::default(),
        clock.clone(),
    ));
    let email = MockEmailSender::new();

    let service = VerificationService::with_clock(
        store.clone(),
        rate_limiter.clone(),
        Arc::new(email.clone()),
        VerificationServiceConfig::default(),
        clock.clone(),
    );

    Flow {
        service,
        store,
        rate_limiter,
        email,
        clock,
    }
}

#[tokio::test]
async fn test_issue_then_verify_with_emailed_code() {
    let f = flow();

    let issued = f
        .service
        .issue(IssueRequest::new("user1", "a@x.com"))
        .await
        .unwrap();

    let emailed = f.email.last_code().unwrap();
    assert_eq!(emailed, issued.code);
    assert_eq!(f.email.last_message().unwrap().to, "a@x.com");

    f.clock.advance(Duration::minutes(2));
    let err = f.service.verify("user1", "000000").await;
    if emailed != "000000" {
        assert_eq!(err.unwrap_err(), VerificationError::Mismatch);
    }

    let verified = f.service.verify("user1", &emailed).await.unwrap();
    assert_eq!(verified.record_id, issued.record_id);

    f.clock.advance(Duration::seconds(30));
    assert_eq!(
        f.service.verify("user1", &emailed).await.unwrap_err(),
        VerificationError::AlreadyUsed
    );

    f.clock.advance(Duration::seconds(31));
    assert_eq!(
        f.service.verify("user1", &emailed).await.unwrap_err(),
        VerificationError::NotFound
    );
}

#[tokio::test]
async fn test_code_expires_after_five_minutes() {
    let f = flow();
    let issued = f
        .service
        .issue(IssueRequest::new("user1", "a@x.com"))
        .await
        .unwrap();

    f.clock.advance(Duration::minutes(6));
    assert_eq!(
        f.service.verify("user1", &issued.code).await.unwrap_err(),
        VerificationError::Expired
    );
    assert!(f.store.is_empty());
}

#[tokio::test]
async fn test_fourth_request_in_fifteen_minutes_waits_four_minutes() {
    let f = flow();

    for step in [0, 5, 5] {
        f.clock.advance(Duration::minutes(step));
        f.service
            .issue(IssueRequest::new("user1", "A@X.com"))
            .await
            .unwrap();
    }

    f.clock.advance(Duration::minutes(1));
    let err = f
        .service
        .issue(IssueRequest::new("user1", "a@x.com"))
        .await
        .unwrap_err();

    assert_eq!(err.retry_after_minutes(), Some(4));
    assert_eq!(f.email.message_count(), 3);

    f.clock.advance(Duration::minutes(4));
    assert!(f
        .service
        .issue(IssueRequest::new("user1", "a@x.com"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_sweeper_removes_dead_records_only() {
    let f = flow();

    let stale = f
        .service
        .issue(IssueRequest::new("stale", "a@x.com"))
        .await
        .unwrap();
    let spent = f
        .service
        .issue(IssueRequest::new("spent", "b@x.com"))
        .await
        .unwrap();
    f.service.verify("spent", &spent.code).await.unwrap();

    f.clock.advance(Duration::minutes(4));
    f.service
        .issue(IssueRequest::new("fresh", "c@x.com"))
        .await
        .unwrap();

    f.clock.advance(Duration::minutes(2));
    let report = f.service.sweeper().sweep_once().await.unwrap();

    assert_eq!(report.scanned, 3);
    assert_eq!(report.removed, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(f.store.len(), 1);

    assert_eq!(
        f.service.verify("stale", &stale.code).await.unwrap_err(),
        VerificationError::NotFound
    );
    assert!(f.clock.now() > stale.expires_at);
}

#[tokio::test]
async fn test_sweep_ticks_release_idle_rate_limit_keys() {
    let f = flow();

    for i in 0..50 {
        f.service
            .issue(IssueRequest::new(format!("user{}", i), format!("u{}@x.com", i)))
            .await
            .unwrap();
    }
    assert_eq!(f.rate_limiter.tracked_keys(), 50);

    f.clock.advance(Duration::hours(2));
    let report = f.service.sweeper().sweep_once().await.unwrap();

    assert_eq!(report.pruned_keys, 50);
    assert_eq!(report.removed, 50);
    assert_eq!(f.rate_limiter.tracked_keys(), 0);
    assert_eq!(f.store.len(), 0);
}

#[tokio::test]
async fn test_delivery_failure_surfaces_and_keeps_record() {
    let clock = Arc::new(ManualClock::starting_now());
    let store = Arc::new(InMemoryCodeStore::new());
    let service = VerificationService::with_clock(
        store.clone(),
        Arc::new(InMemoryRateLimiter::with_clock(
            &RateLimitConfig::default(),
            clock.clone(),
        )),
        Arc::new(MockEmailSender::failing()),
        VerificationServiceConfig::default(),
        clock,
    );

    let err = service
        .issue(IssueRequest::new("user1", "a@x.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, VerificationError::DeliveryFailed { .. }));
    assert_eq!(store.len(), 1);
}
