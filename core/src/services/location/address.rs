//! Best-effort address labels

use std::time::Duration;

use civic_shared::Coordinate;
use tracing::debug;

use super::traits::ReverseGeocoder;

/// Address line for `coordinate`, or its numeric label
///
/// Never fails: a missing geocoder, a geocoder error, a blank answer or a
/// timeout all produce `"{lat:.6}, {lng:.6}"`.
pub async fn address_label(
    geocoder: Option<&dyn ReverseGeocoder>,
    coordinate: Coordinate,
    timeout: Duration,
) -> String {
    let Some(geocoder) = geocoder else {
        return coordinate.to_label();
    };

    match tokio::time::timeout(timeout, geocoder.reverse_geocode(coordinate)).await {
        Ok(Ok(label)) if !label.trim().is_empty() => label.trim().to_string(),
        Ok(Ok(_)) => coordinate.to_label(),
        Ok(Err(e)) => {
            debug!(error = %e, event = "reverse_geocode_failed", "Using numeric address label");
            coordinate.to_label()
        }
        Err(_) => {
            debug!(
                timeout_ms = timeout.as_millis() as u64,
                event = "reverse_geocode_timeout",
                "Using numeric address label"
            );
            coordinate.to_label()
        }
    }
}
