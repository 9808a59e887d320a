//! Value objects representing immutable domain concepts.

pub mod otp;
pub mod position;

// Re-export commonly used types
pub use otp::{Admission, AuthSession, ConfirmationHandle};
pub use position::{NearbyItem, PositionOptions, PositionSource, ResolvedPosition, WatchId};
