//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for CivicPulse. It
//! provides concrete implementations of the collaborator traits defined in
//! `civic_core`, plus process-level setup.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Auth**: phone-auth providers (Identity Toolkit REST, development bypass)
//! - **Geo**: reverse geocoding (Nominatim) and a simulated device
//! - **Config**: `.env` loading and adapter settings
//! - **Telemetry**: `tracing` subscriber initialisation

// Re-export core types for convenience
pub use civic_core::errors::*;

/// Phone-auth provider implementations
pub mod auth;

/// Configuration loading for infrastructure services
pub mod config;

/// Geocoding and device location implementations
pub mod geo;

/// Tracing subscriber setup
pub mod telemetry;

pub use auth::{create_phone_auth, DevPhoneAuth, IdentityToolkitPhoneAuth, PhoneAuthClient};
pub use config::{load_config, InfrastructureConfig};
pub use geo::{NominatimGeocoder, SimulatedGeolocation};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
