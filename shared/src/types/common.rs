//! Common type definitions and utilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type alias
pub type Timestamp = DateTime<Utc>;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Coordinate for location-based features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Calculate distance to another coordinate (in meters)
    /// Using Haversine formula
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Distance to another coordinate in kilometers
    pub fn distance_km_to(&self, other: &Coordinate) -> f64 {
        self.distance_to(other) / 1000.0
    }

    /// Numeric address label with six decimal places, e.g. `13.041800, 80.234100`
    pub fn to_label(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_distance() {
        let sf = Coordinate::new(37.7749, -122.4194);
        let la = Coordinate::new(34.0522, -118.2437);

        let distance_km = sf.distance_km_to(&la);

        // Should be approximately 559 km (with some tolerance for calculation)
        assert!((distance_km - 559.0).abs() < 10.0);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let t_nagar = Coordinate::new(13.0418, 80.2341);
        assert!(t_nagar.distance_to(&t_nagar).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(Coordinate::new(13.0418, 80.2341).is_valid());
        assert!(Coordinate::new(-90.0, 180.0).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_coordinate_label() {
        let c = Coordinate::new(13.0418, 80.2341);
        assert_eq!(c.to_label(), "13.041800, 80.234100");
        assert_eq!(Coordinate::new(-1.5, 2.25).to_string(), "-1.500000, 2.250000");
    }
}
