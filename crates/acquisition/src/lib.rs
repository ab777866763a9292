//! Sideline Acquisition Crate
//!
//! This crate provides resilient, multi-source fetching of sports data
//! (betting lines, game results, weather forecasts) for the Sideline
//! prediction tools.
//!
//! # Overview
//!
//! The acquisition crate supports:
//! - Multiple interchangeable providers per request kind, tried in order
//! - Per-provider request spacing and bounded exponential-backoff retry
//! - Normalization of every provider's payload into one record shape
//! - Validation with strict (reject) and non-strict (quarantine) modes
//!
//! # Architecture
//!
//! ```text
//! +----------------------+
//! | AcquisitionRequest   |  (odds / games / forecast)
//! +----------------------+
//!            |
//!            v
//! +----------------------+
//! | FallbackChain        |  (preference order per kind)
//! +----------------------+
//!            |
//!            v
//! +----------------------+     +------------------+
//! | RateLimiter + Retry  | --> | ProviderAdapter  |  (scrapers, REST APIs)
//! +----------------------+     +------------------+
//!            |
//!            v
//! +----------------------+
//! | normalize            |  (RawRecord -> NormalizedRecord)
//! +----------------------+
//!            |
//!            v
//! +----------------------+
//! | Validator            |  (accepted / quarantined / rejected)
//! +----------------------+
//!            |
//!            v
//! +----------------------+
//! | AcquisitionResult    |  (records + provenance + state trace)
//! +----------------------+
//! ```
//!
//! # Core Types
//!
//! - [`AcquisitionCoordinator`] - Entry point wiring providers, pipeline and validation
//! - [`ProviderAdapter`] - Trait every data source implements
//! - [`RawRecord`] - Untyped provider payload
//! - [`NormalizedRecord`] - Domain-typed record with explicit missing fields
//! - [`AcquisitionError`] - Error taxonomy with retry classification
//! - [`AcquisitionConfig`] - Tunable delays, retry policy and preference order

pub mod config;
pub mod coordinator;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod validate;

pub use config::AcquisitionConfig;
pub use coordinator::{AcquisitionCoordinator, AcquisitionResult};
pub use errors::{AcquisitionError, ProviderFailure, RetryClass};

pub use models::{
    AcquisitionRequest, Field, ForecastRequest, GameRecord, GameRequest, GameStatus, League,
    NormalizedRecord, OddsRecord, OddsRequest, ProviderId, RawRecord, RawSchema, RecordData,
    RecordKind, RequestKind, UnitSystem, WeatherRecord,
};

pub use normalize::{normalize, normalize_all};

pub use pipeline::{
    AcquisitionState, FallbackChain, FallbackOutcome, Provenance, ProviderAttempt, RateLimiter,
    RetryPolicy, RetryStats, StateTrace,
};

pub use validate::{
    RosterSource, StaticRoster, ValidationMode, ValidationVerdict, Validator, ValidatorConfig,
};

// Re-export provider types
pub use provider::accuweather::AccuWeatherProvider;
pub use provider::openweather::OpenWeatherProvider;
pub use provider::{FnAdapter, ProviderAdapter, ProviderClass, RateLimit};
