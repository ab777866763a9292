//! Data models for sports data acquisition.
//!
//! - [`AcquisitionRequest`] and its per-kind request types
//! - [`RawRecord`]: untyped provider payload with provenance
//! - [`NormalizedRecord`]: domain-typed record produced by the normalizer
//! - [`Field`]: explicit present/missing marker for normalized fields

mod raw;
mod record;
mod request;
mod types;

pub use raw::{RawRecord, RawSchema, UnitSystem};
pub use record::{
    american_to_decimal, GameRecord, GameStatus, NormalizedRecord, OddsRecord, RecordData,
    WeatherRecord,
};
pub use request::{AcquisitionRequest, ForecastRequest, GameRequest, OddsRequest};
pub use types::{Field, League, ProviderId, RecordKind, RequestKind};
