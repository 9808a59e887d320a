//! Shared utilities and common types for CivicPulse services
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types
//! - Geographic coordinates
//! - Phone number utilities

pub mod config;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{AppConfig, Environment, LocationConfig, LogFormat, LoggingConfig, OtpConfig};
pub use types::{Coordinate, Timestamp};
pub use utils::phone;
