//! Storage interfaces and their in-process implementations.

pub mod rate_limit;

pub use rate_limit::{EntryUpdate, InMemoryRateLimitStore, RateLimitStore};
