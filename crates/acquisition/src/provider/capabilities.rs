//! Provider classes and rate limiting configuration.
//!
//! This module defines how an adapter describes itself to the coordinator:
//! what kind of transport backs it and how politely it must be called.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default spacing for scraper-backed providers.
pub const DEFAULT_SCRAPER_DELAY: Duration = Duration::from_secs(2);

/// Default spacing for REST API providers.
pub const DEFAULT_API_DELAY: Duration = Duration::from_secs(1);

/// How a provider is reached.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderClass {
    /// Browser automation against a website. Slow and easy to get banned.
    Scraper,
    /// A documented HTTP API.
    RestApi,
}

impl ProviderClass {
    /// Default spacing between requests for this class.
    pub fn default_delay(&self) -> Duration {
        match self {
            ProviderClass::Scraper => DEFAULT_SCRAPER_DELAY,
            ProviderClass::RestApi => DEFAULT_API_DELAY,
        }
    }
}

/// Rate limiting configuration for a provider.
///
/// Controls how aggressively we can call a provider to avoid
/// hitting their rate limits and getting blocked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Minimum delay between requests.
    pub min_delay: Duration,
}

impl RateLimit {
    pub fn for_class(class: ProviderClass) -> Self {
        Self {
            min_delay: class.default_delay(),
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self::for_class(ProviderClass::RestApi)
    }
}
