//! Device position reading entity.

use chrono::{DateTime, Utc};
use civic_shared::Coordinate;
use serde::{Deserialize, Serialize};

/// A single position fix reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationReading {
    /// Latitude in decimal degrees
    pub latitude: f64,

    /// Longitude in decimal degrees
    pub longitude: f64,

    /// Radius in meters of the 68% confidence circle
    pub accuracy_meters: f64,

    /// When the device captured this fix
    pub captured_at: DateTime<Utc>,
}

impl LocationReading {
    /// Creates a reading captured now
    pub fn new(latitude: f64, longitude: f64, accuracy_meters: f64) -> Self {
        Self::captured_at(latitude, longitude, accuracy_meters, Utc::now())
    }

    /// Creates a reading with an explicit capture time
    ///
    /// Negative accuracies are clamped to zero.
    pub fn captured_at(
        latitude: f64,
        longitude: f64,
        accuracy_meters: f64,
        captured_at: DateTime<Utc>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: accuracy_meters.max(0.0),
            captured_at,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Accurate enough to stop watching for better fixes
    pub fn is_good_enough(&self, threshold_meters: f64) -> bool {
        self.accuracy_meters < threshold_meters
    }

    /// Poor enough to warrant one fresh request
    pub fn needs_refinement(&self, threshold_meters: f64) -> bool {
        self.accuracy_meters > threshold_meters
    }
}
