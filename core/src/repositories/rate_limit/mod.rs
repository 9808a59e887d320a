pub mod memory;
pub mod store;

pub use memory::InMemoryRateLimitStore;
pub use store::{EntryUpdate, RateLimitStore};

#[cfg(test)]
mod tests;
