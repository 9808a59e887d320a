//! Position request and result value objects.

use std::fmt;
use std::time::Duration;

use civic_shared::Coordinate;
use serde::{Deserialize, Serialize};

use crate::domain::entities::LocationReading;
use crate::errors::LocationErrorKind;

/// Options passed to the device for a position request or watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the device may return; zero forces a fresh one
    pub maximum_age: Duration,
}

impl PositionOptions {
    pub fn high_accuracy(timeout: Duration, maximum_age: Duration) -> Self {
        Self {
            enable_high_accuracy: true,
            timeout,
            maximum_age,
        }
    }

    /// Same settings with cached fixes disallowed
    pub fn fresh(self) -> Self {
        Self {
            maximum_age: Duration::ZERO,
            ..self
        }
    }
}

/// Device-issued identifier of a position watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Where a resolved position came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionSource {
    /// A device reading
    Device(LocationReading),
    /// The configured fallback centre, after the device failed
    Fallback(LocationErrorKind),
}

/// A position that is always usable for centring a map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPosition {
    pub coordinate: Coordinate,
    pub source: PositionSource,
}

impl ResolvedPosition {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PositionSource::Fallback(_))
    }
}

/// An item within the nearby radius and its distance from the centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyItem<T> {
    pub item: T,
    pub distance_km: f64,
}

impl<T> NearbyItem<T> {
    /// Distance label such as `0.4 km`
    pub fn distance_label(&self) -> String {
        format!("{:.1} km", self.distance_km)
    }
}
