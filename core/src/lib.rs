//! # CivicPulse Core
//!
//! Domain layer for the CivicPulse backend: phone sign-in and device
//! location. This crate contains the domain entities, the OTP dispatch
//! controller, the location resolver, the collaborator traits adapters
//! implement, and the error types shared by all of them.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    Admission, AuthSession, ConfirmationHandle, LocationReading, NearbyItem, PositionOptions,
    PositionSource, RateLimitEntry, ResolvedPosition, WatchId,
};
pub use errors::*;
pub use repositories::{InMemoryRateLimitStore, RateLimitStore};
pub use services::*;
