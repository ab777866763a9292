//! Provider adapter abstractions and implementations.
//!
//! This module contains:
//! - The `ProviderAdapter` trait that every data source is wrapped in
//! - Provider classes and rate limiting configuration
//! - `FnAdapter` for sources handed over as plain async functions
//! - REST adapters for the weather services
//!
//! The core never talks to a provider directly. Scrapers and REST clients
//! return raw records through `fetch`; the pipeline owns spacing, retries
//! and fallback.

mod capabilities;
mod function;
mod http;
mod traits;

pub mod accuweather;
pub mod openweather;

pub use capabilities::{ProviderClass, RateLimit, DEFAULT_API_DELAY, DEFAULT_SCRAPER_DELAY};
pub use function::FnAdapter;
pub use traits::ProviderAdapter;
