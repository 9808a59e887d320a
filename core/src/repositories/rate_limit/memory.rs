//! Process-local rate-limit store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::{Admission, RateLimitEntry};

use super::store::{EntryUpdate, RateLimitStore};

/// In-memory store; every update runs under one lock
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of destinations currently tracked
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn update(&self, key: &str, update: EntryUpdate) -> Result<Admission, String> {
        let mut entries = self.entries.lock().await;
        let mut slot = entries.remove(key);
        let admission = update(&mut slot);
        if let Some(entry) = slot {
            entries.insert(key.to_string(), entry);
        }
        Ok(admission)
    }

    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>, String> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<(), String> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
