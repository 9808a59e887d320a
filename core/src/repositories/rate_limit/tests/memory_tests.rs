use chrono::Utc;
use std::sync::Arc;

use crate::domain::{Admission, RateLimitEntry};
use crate::repositories::rate_limit::{InMemoryRateLimitStore, RateLimitStore};

#[tokio::test]
async fn test_update_creates_and_reads_entry() {
    let store = InMemoryRateLimitStore::new();
    let now = Utc::now();

    let admission = store
        .update(
            "+919999999999",
            Box::new(move |slot| {
                *slot = Some(RateLimitEntry::first_attempt(now));
                Admission::Allowed { attempt: 1 }
            }),
        )
        .await
        .unwrap();

    assert_eq!(admission, Admission::Allowed { attempt: 1 });
    let entry = store.get("+919999999999").await.unwrap().unwrap();
    assert_eq!(entry.attempt_count, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_update_clearing_slot_removes_entry() {
    let store = InMemoryRateLimitStore::new();
    let now = Utc::now();
    store
        .update(
            "a",
            Box::new(move |slot| {
                *slot = Some(RateLimitEntry::first_attempt(now));
                Admission::Allowed { attempt: 1 }
            }),
        )
        .await
        .unwrap();

    store
        .update(
            "a",
            Box::new(|slot| {
                *slot = None;
                Admission::Allowed { attempt: 0 }
            }),
        )
        .await
        .unwrap();

    assert!(store.get("a").await.unwrap().is_none());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_remove_missing_key_is_ok() {
    let store = InMemoryRateLimitStore::new();
    assert!(store.remove("missing").await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_are_not_lost() {
    let store = Arc::new(InMemoryRateLimitStore::new());
    let now = Utc::now();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .update(
                    "shared",
                    Box::new(move |slot| {
                        let entry = slot.get_or_insert_with(|| RateLimitEntry {
                            attempt_count: 0,
                            last_attempt_at: now,
                            backoff_until: None,
                        });
                        entry.attempt_count += 1;
                        Admission::Allowed {
                            attempt: entry.attempt_count,
                        }
                    }),
                )
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let entry = store.get("shared").await.unwrap().unwrap();
    assert_eq!(entry.attempt_count, 50);
}
