//! Type definitions shared across crates
//!
//! - `common` - Timestamps and geographic coordinates

pub mod common;

pub use common::{Coordinate, Timestamp};
