//! Device and geocoding collaborator traits

use async_trait::async_trait;
use civic_shared::Coordinate;
use tokio::sync::mpsc;

use crate::domain::{LocationReading, PositionOptions, WatchId};
use crate::errors::LocationError;

/// Channel a device pushes watch updates into
pub type PositionSink = mpsc::UnboundedSender<Result<LocationReading, LocationError>>;

/// Device geolocation API
///
/// Mirrors the browser Geolocation interface: one-shot requests, standing
/// watches identified by a [`WatchId`], and synchronous `clear_watch`.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Request a single fix
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<LocationReading, LocationError>;

    /// Start delivering fixes into `sink` until cleared
    ///
    /// # Returns
    /// * `Ok(WatchId)` - Identifier to pass to [`clear_watch`](Self::clear_watch)
    /// * `Err(LocationError)` - The device refused to start the watch
    async fn watch_position(
        &self,
        options: PositionOptions,
        sink: PositionSink,
    ) -> Result<WatchId, LocationError>;

    /// Stop a watch; unknown ids are ignored
    fn clear_watch(&self, id: WatchId);
}

/// Reverse geocoding service turning coordinates into an address line
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, String>;
}
