//! OpenWeather forecast provider.
//!
//! Uses the 2.5 API:
//! - /forecast returns 3-hourly entries for five days; the one closest to
//!   kickoff is kept
//! - /weather returns current conditions, used once kickoff has passed
//!
//! API documentation: https://openweathermap.org/api

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::http::{closest_entry, JsonClient};
use crate::errors::AcquisitionError;
use crate::models::{
    AcquisitionRequest, ForecastRequest, RawRecord, RawSchema, RecordKind, RequestKind, UnitSystem,
};
use crate::provider::ProviderAdapter;

const BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const PROVIDER_ID: &str = "openweather";

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /forecast
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<Value>,
}

// ============================================================================
// OpenWeatherProvider
// ============================================================================

/// OpenWeather REST provider.
pub struct OpenWeatherProvider {
    http: JsonClient,
    api_key: String,
    units: UnitSystem,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            http: JsonClient::new(PROVIDER_ID, base_url),
            api_key,
            units: UnitSystem::Imperial,
        }
    }

    /// Unit system requested from the API. Payloads are tagged with it so
    /// the normalizer converts metric values.
    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    async fn forecast(&self, request: &ForecastRequest) -> Result<Vec<RawRecord>, AcquisitionError> {
        let location = format!("{},{},US", request.city, request.state);
        let params = [
            ("q", location.as_str()),
            ("appid", self.api_key.as_str()),
            ("units", units_param(self.units)),
        ];

        let entry = if request.at_time <= Utc::now() {
            self.http.get::<Value>("/weather", &params).await?
        } else {
            let response: ForecastResponse = self.http.get("/forecast", &params).await?;
            info!(
                "OpenWeather returned {} forecast entries for {}",
                response.list.len(),
                location
            );
            closest_entry(response.list, request.at_time).ok_or_else(|| AcquisitionError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: format!("No forecast entries for {}", location),
                transient: false,
            })?
        };

        let schema = RawSchema::OpenWeather { units: self.units };
        let record = RawRecord::from_value(PROVIDER_ID, schema, RecordKind::Weather, entry)
            .ok_or_else(|| AcquisitionError::Parse {
                provider: PROVIDER_ID.to_string(),
                message: "weather entry is not an object".to_string(),
                transient: false,
            })?;
        Ok(vec![record])
    }
}

#[async_trait]
impl ProviderAdapter for OpenWeatherProvider {
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

fn units_param(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Imperial => "imperial",
        UnitSystem::Metric => "metric",
    }
}
