//! Unit tests for the background sweeper

use chrono::Duration;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::domain::entities::VerificationRecord;
use crate::services::clock::Clock;
use crate::services::verification::{IssueRequest, SweepReport, VerificationServiceConfig};

use super::mocks::Harness;

fn record(h: &Harness, identifier: &str, issued_ago: Duration) -> VerificationRecord {
    VerificationRecord::with_code(
        identifier,
        "a@x.com",
        "123456",
        h.clock.now() - issued_ago,
        Duration::minutes(5),
    )
}

#[tokio::test]
async fn test_sweep_removes_only_dead_records() {
    let h = Harness::new();
    let now = h.clock.now();

    h.store.insert(record(&h, "live", Duration::minutes(1)));
    h.store.insert(record(&h, "expired", Duration::minutes(6)));

    let mut used_recent = record(&h, "used-recent", Duration::minutes(1));
    used_recent.mark_used(now - Duration::seconds(30));
    h.store.insert(used_recent);

    let mut used_old = record(&h, "used-old", Duration::minutes(3));
    used_old.mark_used(now - Duration::seconds(90));
    h.store.insert(used_old);

    let mut used_expired = record(&h, "used-expired", Duration::minutes(10));
    used_expired.mark_used(now - Duration::minutes(9));
    h.store.insert(used_expired);

    let report = h.service.sweeper().sweep_once().await.unwrap();

    assert_eq!(
        report,
        SweepReport {
            scanned: 5,
            removed: 3,
            failed: 0,
            pruned_keys: 0,
        }
    );
    assert!(h.store.record("live").is_some());
    assert!(h.store.record("used-recent").is_some());
    assert!(h.store.record("expired").is_none());
    assert!(h.store.record("used-old").is_none());
    assert!(h.store.record("used-expired").is_none());
}

#[tokio::test]
async fn test_sweep_never_removes_pending_unexpired() {
    let h = Harness::new();
    h.store.insert(record(&h, "edge", Duration::minutes(5)));

    let report = h.service.sweeper().sweep_once().await.unwrap();
    assert_eq!(report.removed, 0);
    assert!(h.store.record("edge").is_some());

    h.clock.advance(Duration::milliseconds(1));
    let report = h.service.sweeper().sweep_once().await.unwrap();
    assert_eq!(report.removed, 1);
}

#[tokio::test]
async fn test_sweep_on_empty_store() {
    let h = Harness::new();
    let report = h.service.sweeper().sweep_once().await.unwrap();
    assert_eq!(report, SweepReport::default());
}

#[tokio::test]
async fn test_sweep_reports_scan_failure() {
    let h = Harness::new();
    h.store.fail_scan.store(true, Ordering::SeqCst);

    assert!(h.service.sweeper().sweep_once().await.is_err());
}

async fn wait_for_sweeps(handle: &crate::services::verification::SweeperHandle, count: u64) {
    for _ in 0..100 {
        if handle.completed_sweeps() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("sweeper did not complete {} ticks", count);
}

#[tokio::test(start_paused = true)]
async fn test_spawned_sweeper_runs_on_interval() {
    let config = VerificationServiceConfig {
        sweep_interval: std::time::Duration::from_secs(300),
        ..Default::default()
    };
    let h = Harness::with_config(config);
    h.store.insert(record(&h, "expired", Duration::minutes(6)));

    let handle = h.service.spawn_sweeper();
    tokio::task::yield_now().await;
    assert!(h.store.record("expired").is_some());

    tokio::time::sleep(std::time::Duration::from_secs(301)).await;
    wait_for_sweeps(&handle, 1).await;
    assert!(h.store.record("expired").is_none());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_spawned_sweeper_survives_store_errors() {
    let h = Harness::new();
    h.store.fail_scan.store(true, Ordering::SeqCst);

    let sweeper = Arc::new(h.service.sweeper());
    let handle = sweeper.spawn();

    tokio::time::sleep(std::time::Duration::from_secs(601)).await;
    wait_for_sweeps(&handle, 2).await;

    // Store recovers; the next tick cleans up
    h.store.fail_scan.store(false, Ordering::SeqCst);
    h.store.insert(record(&h, "expired", Duration::minutes(6)));
    tokio::time::sleep(std::time::Duration::from_secs(300)).await;
    wait_for_sweeps(&handle, 3).await;
    assert!(h.store.record("expired").is_none());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_sweep_prunes_idle_rate_limit_windows() {
    let h = Harness::new();

    for i in 0..5 {
        h.service
            .issue(IssueRequest::new(format!("user{}", i), format!("u{}@x.com", i)))
            .await
            .unwrap();
    }
    assert_eq!(h.rate_limiter.tracked_keys(), 5);

    h.clock.advance(Duration::minutes(10));
    let report = h.service.sweeper().sweep_once().await.unwrap();
    assert_eq!(report.pruned_keys, 0);
    assert_eq!(report.removed, 5);
    assert_eq!(h.rate_limiter.tracked_keys(), 5);

    h.clock.advance(Duration::minutes(6));
    let report = h.service.sweeper().sweep_once().await.unwrap();
    assert_eq!(report.pruned_keys, 5);
    assert_eq!(h.rate_limiter.tracked_keys(), 0);
}
