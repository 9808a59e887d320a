//! Device location configuration module

use serde::{Deserialize, Serialize};

use super::env_or;
use crate::types::Coordinate;

/// Thresholds and timeouts for position acquisition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    /// Timeout for a single position request in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Oldest cached reading accepted by default, in milliseconds
    #[serde(default = "default_maximum_age_ms")]
    pub default_maximum_age_ms: u64,

    /// Readings less accurate than this trigger one fresh request
    #[serde(default = "default_refine_threshold_meters")]
    pub refine_threshold_meters: f64,

    /// Readings more accurate than this end a watch
    #[serde(default = "default_good_enough_meters")]
    pub good_enough_meters: f64,

    /// Absolute bound on a watch in milliseconds
    #[serde(default = "default_watch_timeout_ms")]
    pub watch_timeout_ms: u64,

    /// Reverse geocoding timeout in milliseconds
    #[serde(default = "default_geocode_timeout_ms")]
    pub geocode_timeout_ms: u64,

    /// Radius for nearby report filtering
    #[serde(default = "default_nearby_radius_km")]
    pub nearby_radius_km: f64,

    /// Map centre used when no device position is available
    #[serde(default = "default_fallback_center")]
    pub fallback_center: Coordinate,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            default_maximum_age_ms: default_maximum_age_ms(),
            refine_threshold_meters: default_refine_threshold_meters(),
            good_enough_meters: default_good_enough_meters(),
            watch_timeout_ms: default_watch_timeout_ms(),
            geocode_timeout_ms: default_geocode_timeout_ms(),
            nearby_radius_km: default_nearby_radius_km(),
            fallback_center: default_fallback_center(),
        }
    }
}

impl LocationConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let fallback_center = Coordinate::new(
            env_or("LOCATION_FALLBACK_LAT", defaults.fallback_center.latitude),
            env_or("LOCATION_FALLBACK_LNG", defaults.fallback_center.longitude),
        );
        Self {
            request_timeout_ms: env_or("LOCATION_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms),
            watch_timeout_ms: env_or("LOCATION_WATCH_TIMEOUT_MS", defaults.watch_timeout_ms),
            nearby_radius_km: env_or("LOCATION_NEARBY_RADIUS_KM", defaults.nearby_radius_km),
            fallback_center,
            ..defaults
        }
    }
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_maximum_age_ms() -> u64 {
    60_000 // accept a cached fix up to a minute old
}

fn default_refine_threshold_meters() -> f64 {
    100.0
}

fn default_good_enough_meters() -> f64 {
    50.0
}

fn default_watch_timeout_ms() -> u64 {
    30_000
}

fn default_geocode_timeout_ms() -> u64 {
    5_000
}

fn default_nearby_radius_km() -> f64 {
    50.0
}

fn default_fallback_center() -> Coordinate {
    // T. Nagar, Chennai
    Coordinate::new(13.0418, 80.2341)
}
