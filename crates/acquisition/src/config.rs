//! Acquisition configuration.
//!
//! Values only. Loading (files, environment) belongs to the caller; the
//! coordinator validates the struct once when it is built.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::AcquisitionError;
use crate::models::RequestKind;
use crate::pipeline::{RetryPolicy, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_RETRIES, DEFAULT_MULTIPLIER};
use crate::provider::{ProviderClass, DEFAULT_API_DELAY, DEFAULT_SCRAPER_DELAY};
use crate::validate::ValidationMode;

/// Every recognized option, with its default. Durations are in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Per-provider spacing overrides.
    pub rate_limit_delays: HashMap<String, f64>,
    /// Spacing for scraper-backed providers without an override.
    pub default_scraper_delay: f64,
    /// Spacing for REST providers without an override.
    pub default_api_delay: f64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub retry_base_delay: f64,
    /// Backoff growth factor.
    pub retry_multiplier: u32,
    /// Deadline for each fetch attempt.
    pub fetch_timeout: f64,
    pub validation_mode: ValidationMode,
    /// Providers to try per request kind, most preferred first.
    ///
    /// A kind without an entry uses every registered adapter that serves
    /// it, in registration order.
    pub provider_preference_order: HashMap<RequestKind, Vec<String>>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            rate_limit_delays: HashMap::new(),
            default_scraper_delay: DEFAULT_SCRAPER_DELAY.as_secs_f64(),
            default_api_delay: DEFAULT_API_DELAY.as_secs_f64(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: 1.0,
            retry_multiplier: DEFAULT_MULTIPLIER,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT.as_secs_f64(),
            validation_mode: ValidationMode::Strict,
            provider_preference_order: HashMap::new(),
        }
    }
}

impl AcquisitionConfig {
    /// Check every value. Returns the first problem found.
    pub fn validate(&self) -> Result<(), AcquisitionError> {
        for (provider, delay) in &self.rate_limit_delays {
            check_delay(&format!("rate_limit_delays.{}", provider), *delay)?;
        }
        check_delay("default_scraper_delay", self.default_scraper_delay)?;
        check_delay("default_api_delay", self.default_api_delay)?;
        check_delay("retry_base_delay", self.retry_base_delay)?;

        if !(self.fetch_timeout > 0.0 && representable(self.fetch_timeout)) {
            return Err(invalid(format!(
                "fetch_timeout must be a positive number of seconds, got {}",
                self.fetch_timeout
            )));
        }

        if self.retry_multiplier < 1 {
            return Err(invalid("retry_multiplier must be at least 1".to_string()));
        }

        for (kind, providers) in &self.provider_preference_order {
            let mut seen = HashSet::new();
            for provider in providers {
                if provider.trim().is_empty() {
                    return Err(invalid(format!(
                        "provider_preference_order.{} contains an empty provider id",
                        kind
                    )));
                }
                if !seen.insert(provider.as_str()) {
                    return Err(invalid(format!(
                        "provider_preference_order.{} lists '{}' more than once",
                        kind, provider
                    )));
                }
            }
        }

        Ok(())
    }

    /// The configured spacing override for a provider.
    pub fn rate_limit_override(&self, provider: &str) -> Option<Duration> {
        self.rate_limit_delays.get(provider).map(|s| secs(*s))
    }

    /// Spacing for a provider class when no override applies.
    pub fn class_delay(&self, class: ProviderClass) -> Duration {
        match class {
            ProviderClass::Scraper => secs(self.default_scraper_delay),
            ProviderClass::RestApi => secs(self.default_api_delay),
        }
    }

    pub fn fetch_timeout_duration(&self) -> Duration {
        secs(self.fetch_timeout)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
            .with_backoff(secs(self.retry_base_delay), self.retry_multiplier)
    }

    /// Preference list for a kind, if one was configured.
    pub fn preference_for(&self, kind: RequestKind) -> Option<&[String]> {
        self.provider_preference_order.get(&kind).map(Vec::as_slice)
    }
}

fn check_delay(name: &str, seconds: f64) -> Result<(), AcquisitionError> {
    if seconds >= 0.0 && representable(seconds) {
        Ok(())
    } else {
        Err(invalid(format!(
            "{} must be a non-negative number of seconds, got {}",
            name, seconds
        )))
    }
}

fn invalid(message: String) -> AcquisitionError {
    AcquisitionError::InvalidConfig { message }
}

/// Finite, and small enough to fit a `Duration`.
fn representable(seconds: f64) -> bool {
    Duration::try_from_secs_f64(seconds).is_ok()
}

/// Seconds to a duration. Only validated values reach here; anything else
/// saturates rather than shrinking a wait.
fn secs(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}
