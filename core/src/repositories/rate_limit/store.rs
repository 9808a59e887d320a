//! Rate-limit store trait holding one entry per destination.

use async_trait::async_trait;

use crate::domain::{Admission, RateLimitEntry};

/// Read-decide-write step applied to a single slot
///
/// The slot is `None` when the destination has no entry; setting it to
/// `None` removes the entry.
pub type EntryUpdate = Box<dyn FnOnce(&mut Option<RateLimitEntry>) -> Admission + Send>;

/// Storage for per-destination rate-limit entries
///
/// Implementations must run each `update` atomically with respect to other
/// calls for the same key, so concurrent sends never observe a half-updated
/// entry.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Apply `update` to the slot for `key` and persist the result
    ///
    /// # Returns
    /// * `Ok(Admission)` - The decision produced by `update`
    /// * `Err(String)` - The store could not be read or written
    async fn update(&self, key: &str, update: EntryUpdate) -> Result<Admission, String>;

    /// Current entry for `key`, if any
    async fn get(&self, key: &str) -> Result<Option<RateLimitEntry>, String>;

    /// Delete the entry for `key`; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<(), String>;
}
