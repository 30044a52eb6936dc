//! Client gate behavior through the public API

use chrono::{Duration, Utc};
use hk_core::{
    retry_after_minutes, Admission, GateDecision, GatedAction, RateLimitWindow, ResendCooldown,
};

#[test]
fn test_resend_cooldown_is_independent_of_server_window() {
    let start = Utc::now();
    let mut cooldown = ResendCooldown::new(Duration::seconds(60));
    let mut window = RateLimitWindow::new();

    // Client resends as soon as the cooldown allows
    let mut now = start;
    let mut outcomes = Vec::new();
    for _ in 0..4 {
        assert!(cooldown.can_resend(now));
        outcomes.push(window.admit(now, 3, Duration::minutes(15)));
        cooldown.record_send(now);
        now += cooldown.remaining(now);
    }

    assert!(outcomes[..3].iter().all(Admission::is_allowed));
    match outcomes[3] {
        Admission::Denied { retry_after } => {
            assert_eq!(retry_after, Duration::minutes(12));
            assert_eq!(retry_after_minutes(retry_after), 12);
        }
        other => panic!("Expected denial, got {:?}", other),
    }
}

#[test]
fn test_gate_with_2fa_disabled_runs_once() {
    let mut log = Vec::new();
    let mut gate = GatedAction::new(false, || log.push("changed password"));

    assert_eq!(gate.begin(), GateDecision::Completed(()));
    assert_eq!(gate.on_verified(), None);
    drop(gate);

    assert_eq!(log, vec!["changed password"]);
}

#[test]
fn test_gate_with_2fa_enabled_waits_for_verified() {
    let mut gate = GatedAction::new(true, || "deleted account");

    assert_eq!(gate.begin(), GateDecision::CodeRequired);
    assert_eq!(gate.begin(), GateDecision::Idle);
    assert_eq!(gate.on_verified(), Some("deleted account"));
    assert_eq!(gate.on_verified(), None);
}
