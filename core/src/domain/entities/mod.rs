//! Domain entities representing core business objects.

pub mod location_reading;
pub mod rate_limit_entry;

// Re-export commonly used types
pub use location_reading::LocationReading;
pub use rate_limit_entry::RateLimitEntry;
