//! Raw provider payloads.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ProviderId, RecordKind};

/// Unit system of a payload whose values carry no unit of their own.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// Fahrenheit and miles per hour.
    #[default]
    Imperial,
    /// Celsius and meters per second.
    Metric,
}

/// Shape of a raw payload, which selects the normalizer mapping.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "schema")]
pub enum RawSchema {
    /// Flat payload already keyed by normalized field names.
    Canonical,
    /// Odds rows scraped from Action Network.
    ActionNetwork,
    /// Game objects from the Overtime API.
    Overtime,
    /// AccuWeather hourly forecast or current conditions entry.
    AccuWeather,
    /// OpenWeather forecast list item or current weather object.
    OpenWeather { units: UnitSystem },
}

/// An untyped provider payload.
///
/// Immutable once built. Only the normalizer turns it into a
/// [`NormalizedRecord`](super::NormalizedRecord).
#[derive(Clone, Debug, Serialize)]
pub struct RawRecord {
    source: ProviderId,
    schema: RawSchema,
    kind: RecordKind,
    payload: Map<String, Value>,
    fetched_at: DateTime<Utc>,
}

impl RawRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        source: impl Into<ProviderId>,
        schema: RawSchema,
        kind: RecordKind,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            source: source.into(),
            schema,
            kind,
            payload,
            fetched_at: Utc::now(),
        }
    }

    /// Create a record from a JSON value, which must be an object.
    ///
    /// Returns `None` for any other JSON type.
    pub fn from_value(
        source: impl Into<ProviderId>,
        schema: RawSchema,
        kind: RecordKind,
        payload: Value,
    ) -> Option<Self> {
        match payload {
            Value::Object(map) => Some(Self::new(source, schema, kind, map)),
            _ => None,
        }
    }

    /// Override the fetch timestamp.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    pub fn source(&self) -> &ProviderId {
        &self.source
    }

    pub fn schema(&self) -> RawSchema {
        self.schema
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}
