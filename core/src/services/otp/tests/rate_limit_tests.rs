use chrono::{Duration, Utc};

use crate::domain::{Admission, RateLimitEntry};
use crate::services::otp::rate_limit::RateLimitPolicy;

#[test]
fn test_first_attempt_creates_entry() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = None;

    assert_eq!(policy.admit(&mut slot, now), Admission::Allowed { attempt: 1 });
    let entry = slot.unwrap();
    assert_eq!(entry.attempt_count, 1);
    assert!(entry.backoff_until.is_none());
}

#[test]
fn test_fourth_attempt_enters_first_backoff_tier() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = None;

    for expected in 1..=3 {
        assert_eq!(
            policy.admit(&mut slot, now),
            Admission::Allowed { attempt: expected }
        );
    }

    let admission = policy.admit(&mut slot, now);
    assert_eq!(
        admission,
        Admission::Rejected {
            wait: std::time::Duration::from_secs(2)
        }
    );
    let entry = slot.as_ref().unwrap();
    assert_eq!(entry.attempt_count, 4);
    assert_eq!(entry.backoff_until, Some(now + Duration::seconds(2)));
}

#[test]
fn test_backoff_rejects_without_counting() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = Some(RateLimitEntry {
        attempt_count: 4,
        last_attempt_at: now,
        backoff_until: Some(now + Duration::milliseconds(1500)),
    });

    let admission = policy.admit(&mut slot, now + Duration::milliseconds(200));
    assert!(!admission.is_allowed());
    assert_eq!(admission.wait_seconds(), 2);
    assert_eq!(slot.unwrap().attempt_count, 4);
}

#[test]
fn test_expired_backoff_escalates_tier() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = Some(RateLimitEntry {
        attempt_count: 4,
        last_attempt_at: now,
        backoff_until: Some(now + Duration::seconds(2)),
    });

    let later = now + Duration::seconds(3);
    let admission = policy.admit(&mut slot, later);
    assert_eq!(admission.wait_seconds(), 4);
    assert_eq!(slot.unwrap().attempt_count, 5);
}

#[test]
fn test_stale_entry_resets() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = Some(RateLimitEntry {
        attempt_count: 3,
        last_attempt_at: now,
        backoff_until: None,
    });

    let later = now + Duration::seconds(301);
    assert_eq!(policy.admit(&mut slot, later), Admission::Allowed { attempt: 1 });
    let entry = slot.unwrap();
    assert_eq!(entry.attempt_count, 1);
    assert_eq!(entry.last_attempt_at, later);
}

#[test]
fn test_entry_exactly_at_window_is_not_stale() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = Some(RateLimitEntry {
        attempt_count: 3,
        last_attempt_at: now,
        backoff_until: None,
    });

    let admission = policy.admit(&mut slot, now + Duration::seconds(300));
    assert!(!admission.is_allowed());
}

#[test]
fn test_penalize_missing_entry() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = None;

    let admission = policy.penalize(&mut slot, now);
    assert_eq!(admission.wait_seconds(), 300);
    let entry = slot.unwrap();
    assert_eq!(entry.attempt_count, 3);
    assert_eq!(entry.backoff_until, Some(now + Duration::seconds(300)));
}

#[test]
fn test_penalize_adds_to_existing_count() {
    let policy = RateLimitPolicy::default();
    let now = Utc::now();
    let mut slot = Some(RateLimitEntry::first_attempt(now));

    policy.penalize(&mut slot, now);
    assert_eq!(slot.unwrap().attempt_count, 4);
}
