//! AccuWeather forecast provider.
//!
//! Two calls per request:
//! - /locations/v1/cities/US/search resolves "City, ST" to a location key
//! - /forecasts/v1/hourly/{12,24,72,120}hour/{key} for upcoming games, or
//!   /currentconditions/v1/{key} once kickoff has passed
//!
//! The hourly entry closest to kickoff is returned as a single raw record.
//! API documentation: https://developer.accuweather.com/apis

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use super::http::{closest_entry, JsonClient};
use crate::errors::AcquisitionError;
use crate::models::{
    AcquisitionRequest, ForecastRequest, RawRecord, RawSchema, RecordKind, RequestKind,
};
use crate::provider::ProviderAdapter;

const BASE_URL: &str = "https://dataservice.accuweather.com";
const PROVIDER_ID: &str = "accuweather";

/// Hourly forecast products, shortest first.
const HOURLY_WINDOWS: [i64; 4] = [12, 24, 72, 120];

// ============================================================================
// API Response Structures
// ============================================================================

/// Item of the /locations/v1/cities/US/search response
#[derive(Debug, Deserialize)]
struct LocationItem {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "LocalizedName", default)]
    localized_name: Option<String>,
}

// ============================================================================
// AccuWeatherProvider
// ============================================================================

/// AccuWeather REST provider.
///
/// Free tier allows 50 calls a day, and each request costs two.
pub struct AccuWeatherProvider {
    http: JsonClient,
    api_key: String,
}

impl AccuWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Point the provider at another host (a proxy or a recording server).
    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            http: JsonClient::new(PROVIDER_ID, base_url),
            api_key,
        }
    }

    async fn location_key(&self, city: &str, state: &str) -> Result<String, AcquisitionError> {
        let query = format!("{}, {}", city, state);
        let params = [("apikey", self.api_key.as_str()), ("q", query.as_str())];

        let locations: Vec<LocationItem> = self
            .http
            .get("/locations/v1/cities/US/search", &params)
            .await?;

        let location = locations
            .into_iter()
            .next()
            .ok_or_else(|| AcquisitionError::BadRequest {
                provider: PROVIDER_ID.to_string(),
                message: format!("No location found for '{}'", query),
            })?;

        debug!(
            "AccuWeather location for '{}': {} ({})",
            query,
            location.key,
            location.localized_name.as_deref().unwrap_or("unnamed")
        );
        Ok(location.key)
    }

    async fn forecast(&self, request: &ForecastRequest) -> Result<Vec<RawRecord>, AcquisitionError> {
        let key = self.location_key(&request.city, &request.state).await?;
        let minutes_ahead = (request.at_time - Utc::now()).num_minutes();

        let entry = if minutes_ahead <= 0 {
            self.current_conditions(&key).await?
        } else {
            self.hourly_entry(&key, minutes_ahead, request.at_time).await?
        };

        let record = RawRecord::from_value(PROVIDER_ID, RawSchema::AccuWeather, RecordKind::Weather, entry)
            .ok_or_else(|| parse_error("forecast entry is not an object"))?;
        Ok(vec![record])
    }

    async fn current_conditions(&self, key: &str) -> Result<Value, AcquisitionError> {
        let endpoint = format!("/currentconditions/v1/{}", key);
        let params = [("apikey", self.api_key.as_str()), ("details", "true")];

        let conditions: Vec<Value> = self.http.get(&endpoint, &params).await?;
        conditions
            .into_iter()
            .next()
            .ok_or_else(|| parse_error("empty current conditions response"))
    }

    async fn hourly_entry(
        &self,
        key: &str,
        minutes_ahead: i64,
        at_time: DateTime<Utc>,
    ) -> Result<Value, AcquisitionError> {
        let window = forecast_window(minutes_ahead).ok_or_else(|| AcquisitionError::BadRequest {
            provider: PROVIDER_ID.to_string(),
            message: format!(
                "Game time {} is beyond the {} hour forecast horizon",
                at_time.to_rfc3339(),
                HOURLY_WINDOWS[HOURLY_WINDOWS.len() - 1]
            ),
        })?;

        let endpoint = format!("/forecasts/v1/hourly/{}hour/{}", window, key);
        let params = [
            ("apikey", self.api_key.as_str()),
            ("details", "true"),
            ("metric", "false"),
        ];

        let entries: Vec<Value> = self.http.get(&endpoint, &params).await?;
        info!("AccuWeather returned {} hourly entries", entries.len());

        closest_entry(entries, at_time).ok_or_else(|| parse_error("no hourly entry carries a time"))
    }
}

#[async_trait]
impl ProviderAdapter for AccuWeatherProvider {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn request_kinds(&self) -> &[RequestKind] {
        &[RequestKind::Forecast]
    }

    async fn fetch(&self, request: &AcquisitionRequest) -> Result<Vec<RawRecord>, AcquisitionError> {
        match request {
            AcquisitionRequest::Forecast(forecast) => self.forecast(forecast).await,
            other => Err(AcquisitionError::BadRequest {
                provider: PROVIDER_ID.to_string(),
                message: format!("{} requests are not served", other.kind()),
            }),
        }
    }
}

/// Smallest hourly product that reaches `minutes_ahead`.
fn forecast_window(minutes_ahead: i64) -> Option<i64> {
    HOURLY_WINDOWS
        .iter()
        .copied()
        .find(|hours| minutes_ahead <= hours * 60)
}

fn parse_error(message: &str) -> AcquisitionError {
    AcquisitionError::Parse {
        provider: PROVIDER_ID.to_string(),
        message: message.to_string(),
        transient: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{League, OddsRequest};
    use crate::provider::ProviderClass;

    #[test]
    fn test_provider_identity() {
        let provider = AccuWeatherProvider::new("test_key".to_string());
        assert_eq!(provider.id(), "accuweather");
        assert_eq!(provider.class(), ProviderClass::RestApi);
        assert!(provider.supports(RequestKind::Forecast));
        assert!(!provider.supports(RequestKind::Odds));
    }

    #[test]
    fn test_forecast_window() {
        assert_eq!(forecast_window(30), Some(12));
        assert_eq!(forecast_window(12 * 60), Some(12));
        assert_eq!(forecast_window(12 * 60 + 1), Some(24));
        assert_eq!(forecast_window(48 * 60), Some(72));
        assert_eq!(forecast_window(100 * 60), Some(120));
        assert_eq!(forecast_window(121 * 60), None);
    }

    #[tokio::test]
    async fn test_other_kinds_are_bad_requests() {
        let provider = AccuWeatherProvider::with_base_url("test_key".to_string(), "http://127.0.0.1:9");
        let request = AcquisitionRequest::Odds(OddsRequest { league: League::Nfl });

        let err = provider.fetch(&request).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::BadRequest { .. }));
    }
}
