//! Geocoding and device location module

pub mod nominatim;
pub mod simulated;

pub use nominatim::{NominatimConfig, NominatimGeocoder};
pub use simulated::{SimulatedFix, SimulatedGeolocation};
