//! Nominatim reverse geocoder

use std::time::Duration;

use async_trait::async_trait;
use civic_core::services::ReverseGeocoder;
use civic_shared::Coordinate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::InfrastructureError;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim client configuration
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Service root, without trailing slash
    pub base_url: String,
    /// Sent as `User-Agent`; the public instance rejects anonymous clients
    pub user_agent: String,
    /// Timeout for API requests in seconds
    pub request_timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("CivicPulse/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 5,
        }
    }
}

impl NominatimConfig {
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: var("NOMINATIM_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            user_agent: var("NOMINATIM_USER_AGENT").unwrap_or(defaults.user_agent),
            request_timeout_secs: var("NOMINATIM_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    error: Option<String>,
}

impl ReverseResponse {
    fn into_label(self) -> Result<String, String> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.display_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| "No address for this location".to_string())
    }
}

/// Reverse geocoder backed by a Nominatim instance
pub struct NominatimGeocoder {
    client: Client,
    config: NominatimConfig,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, coordinate: Coordinate) -> Result<String, String> {
        let url = format!("{}/reverse", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coordinate.latitude.to_string()),
                ("lon", coordinate.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| format!("Reverse geocoding request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Reverse geocoding returned HTTP {}", status));
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| format!("Unexpected reverse geocoding response: {}", e))?;

        let label = body.into_label()?;
        debug!(%coordinate, "Reverse geocoded coordinate");
        Ok(label)
    }
}
