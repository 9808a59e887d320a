//! High-accuracy location resolver

use std::sync::{Arc, Mutex};
use std::time::Duration;

use civic_shared::{Coordinate, LocationConfig};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::{
    LocationReading, NearbyItem, PositionOptions, PositionSource, ResolvedPosition,
};
use crate::errors::{LocationError, LocationResult};

use super::address::address_label;
use super::nearby::{filter_nearby, Located};
use super::traits::{GeolocationProvider, ReverseGeocoder};
use super::watch::{LocationWatch, WatchHandle};

/// Resolves device positions with bounded effort
///
/// Holds at most one live watch; starting a new one cancels the previous.
pub struct LocationResolver<G: GeolocationProvider + 'static> {
    device: Arc<G>,
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    config: LocationConfig,
    active_watch: Mutex<Option<WatchHandle>>,
}

impl<G: GeolocationProvider + 'static> LocationResolver<G> {
    pub fn new(device: Arc<G>, config: LocationConfig) -> Self {
        Self {
            device,
            geocoder: None,
            config,
            active_watch: Mutex::new(None),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn config(&self) -> &LocationConfig {
        &self.config
    }

    /// One position, refined once if the first fix is poor
    ///
    /// The first request accepts a cached fix up to `maximum_age` old
    /// (default from config). A fix worse than the refine threshold triggers
    /// exactly one fresh request; if that fails the first fix is kept.
    ///
    /// # Returns
    ///
    /// * `Ok(LocationReading)` - Best fix obtained
    /// * `Err(LocationError)` - The first request failed; no retry is made
    pub async fn resolve_once(
        &self,
        maximum_age: Option<Duration>,
    ) -> LocationResult<LocationReading> {
        let maximum_age = maximum_age
            .unwrap_or_else(|| Duration::from_millis(self.config.default_maximum_age_ms));
        let options = PositionOptions::high_accuracy(self.request_timeout(), maximum_age);

        let first = self.request(options).await.map_err(|error| {
            warn!(
                kind = %error.kind,
                error = %error.message,
                event = "location_request_failed",
                "Position request failed"
            );
            error
        })?;

        if !first.needs_refinement(self.config.refine_threshold_meters) {
            debug!(accuracy_m = first.accuracy_meters, "Position accepted");
            return Ok(first);
        }

        info!(
            accuracy_m = first.accuracy_meters,
            threshold_m = self.config.refine_threshold_meters,
            event = "location_refining",
            "Poor accuracy; requesting a fresh fix"
        );

        match self.request(options.fresh()).await {
            Ok(second) => {
                info!(
                    first_accuracy_m = first.accuracy_meters,
                    accuracy_m = second.accuracy_meters,
                    event = "location_refined",
                    "Fresh fix obtained"
                );
                Ok(second)
            }
            Err(error) => {
                warn!(
                    kind = %error.kind,
                    error = %error.message,
                    accuracy_m = first.accuracy_meters,
                    event = "location_refine_failed",
                    "Fresh fix failed; keeping first reading"
                );
                Ok(first)
            }
        }
    }

    /// A position that is always usable for centring a map
    ///
    /// Any device failure yields the configured fallback centre.
    pub async fn resolve_or_fallback(&self) -> ResolvedPosition {
        match self.resolve_once(None).await {
            Ok(reading) => ResolvedPosition {
                coordinate: reading.coordinate(),
                source: PositionSource::Device(reading),
            },
            Err(error) => {
                info!(
                    kind = %error.kind,
                    center = %self.config.fallback_center,
                    event = "location_fallback",
                    "Using fallback map centre"
                );
                ResolvedPosition {
                    coordinate: self.config.fallback_center,
                    source: PositionSource::Fallback(error.kind),
                }
            }
        }
    }

    /// Watch until a fix is accurate enough, bounded by the watch timeout
    ///
    /// Any watch already started by this resolver is cancelled first.
    pub async fn watch_until_accurate(&self) -> LocationResult<LocationWatch> {
        self.cancel_watch();

        let options = PositionOptions::high_accuracy(self.request_timeout(), Duration::ZERO);
        let (sink, updates) = mpsc::unbounded_channel();
        let watch_id = self.device.watch_position(options, sink).await?;

        let device: Arc<dyn GeolocationProvider> = self.device.clone();
        let handle = WatchHandle::new(device, watch_id);
        let previous = self.lock_active().replace(handle.clone());
        if let Some(previous) = previous {
            // Another caller started a watch while this one was being set up
            previous.cancel();
        }

        info!(
            watch_id = %watch_id,
            timeout_ms = self.config.watch_timeout_ms,
            event = "location_watch_started",
            "Location watch started"
        );

        Ok(LocationWatch::new(
            handle,
            updates,
            Duration::from_millis(self.config.watch_timeout_ms),
            self.config.good_enough_meters,
        ))
    }

    /// Cancel the current watch, if any
    ///
    /// Returns `true` if a live subscription was released.
    pub fn cancel_watch(&self) -> bool {
        let active = self.lock_active().take();
        active.is_some_and(|handle| handle.cancel())
    }

    /// Address line for `coordinate`, falling back to its numeric label
    pub async fn address_for(&self, coordinate: Coordinate) -> String {
        address_label(
            self.geocoder.as_deref(),
            coordinate,
            Duration::from_millis(self.config.geocode_timeout_ms),
        )
        .await
    }

    /// Items within the configured radius of `center`, nearest first
    pub fn nearby<T, I>(&self, center: Coordinate, items: I) -> Vec<NearbyItem<T>>
    where
        T: Located,
        I: IntoIterator<Item = T>,
    {
        filter_nearby(center, items, self.config.nearby_radius_km)
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.config.request_timeout_ms)
    }

    async fn request(&self, options: PositionOptions) -> LocationResult<LocationReading> {
        match tokio::time::timeout(options.timeout, self.device.current_position(options)).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::timeout(options.timeout)),
        }
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<WatchHandle>> {
        self.active_watch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
