//! Error types and retry classification for the acquisition crate.
//!
//! This module provides:
//! - [`AcquisitionError`]: The error enum for every fallible acquisition step
//! - [`RetryClass`]: Classification for determining retry behavior
//! - [`ProviderFailure`]: A provider's terminal failure, kept for provenance
//!
//! Validation problems are not errors. They are reported as data through
//! [`ValidationVerdict`](crate::validate::ValidationVerdict).

mod retry;

pub use retry::RetryClass;

use serde::Serialize;
use thiserror::Error;

use crate::models::{ProviderId, RequestKind};

/// Errors that can occur while acquiring sports data.
///
/// Variants fall into four groups:
///
/// - transport failures (`Network`, `Timeout`, `RemoteRateLimited`,
///   `SessionExpired`, `ServerError`) are retried with backoff;
/// - remote rejections (`Auth`, `BadRequest`) and `SchemaMismatch` take the
///   provider out of the running without retry;
/// - aggregates (`RetriesExhausted`, `AllProvidersFailed`) summarize what
///   happened across attempts and providers;
/// - request level failures (`NoProvidersConfigured`, `UnknownProvider`,
///   `InvalidConfig`) stop the request before any provider is called.
#[derive(Error, Debug, Clone)]
pub enum AcquisitionError {
    /// Connection-level failure talking to the provider.
    #[error("Network error: {provider} - {message}")]
    Network {
        /// The provider that could not be reached
        provider: String,
        /// The underlying transport message
        message: String,
    },

    /// A fetch attempt ran past its deadline.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider told us to slow down (HTTP 429 or equivalent).
    #[error("Rate limited by remote: {provider}")]
    RemoteRateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// A previously valid session expired mid-flight. Re-login is the
    /// adapter's business; the core only retries.
    #[error("Session expired: {provider}")]
    SessionExpired {
        /// The provider whose session expired
        provider: String,
    },

    /// The provider answered with a server-side error (5xx).
    #[error("Server error: {provider} - HTTP {status}")]
    ServerError {
        /// The provider that failed
        provider: String,
        /// HTTP status code or equivalent
        status: u16,
    },

    /// Credentials were refused.
    #[error("Authentication failed: {provider} - {message}")]
    Auth {
        /// The provider that refused the credentials
        provider: String,
        /// The rejection message
        message: String,
    },

    /// The provider rejected the request as malformed or unsupported.
    #[error("Bad request: {provider} - {message}")]
    BadRequest {
        /// The provider that rejected the request
        provider: String,
        /// The rejection message
        message: String,
    },

    /// The provider's response could not be parsed.
    ///
    /// Adapters set `transient` when the payload is known to be incomplete
    /// for a short while (a page that has not finished rendering, say).
    #[error("Parse failure: {provider} - {message}")]
    Parse {
        /// The provider whose payload could not be parsed
        provider: String,
        /// Description of the parse failure
        message: String,
        /// Whether another attempt may succeed
        transient: bool,
    },

    /// A raw record did not match the schema its normalizer expects.
    #[error("Schema mismatch: {provider} - {message}")]
    SchemaMismatch {
        /// The provider that produced the record
        provider: String,
        /// Description of the mismatch
        message: String,
    },

    /// Every allowed attempt against one provider failed with a retryable error.
    #[error("Retries exhausted: {provider} after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// The provider that kept failing
        provider: String,
        /// Total attempts made (first call plus retries)
        attempts: u32,
        /// The last failure observed
        source: Box<AcquisitionError>,
    },

    /// All providers in the fallback chain failed.
    #[error("All providers failed: {}", summarize(failures))]
    AllProvidersFailed {
        /// Each provider's terminal failure, in the order they were tried
        failures: Vec<ProviderFailure>,
    },

    /// No provider is configured for this kind of request.
    #[error("No providers configured for {kind} requests")]
    NoProvidersConfigured {
        /// The request kind with an empty preference list
        kind: RequestKind,
    },

    /// A preference list names a provider that was never registered.
    #[error("Unknown provider in preference order: {provider}")]
    UnknownProvider {
        /// The unregistered provider id
        provider: String,
    },

    /// The configuration failed validation.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the problem
        message: String,
    },
}

impl AcquisitionError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::WithBackoff`]: transient, retry the same provider
    /// - [`RetryClass::NextProvider`]: this provider is out, try the next
    /// - [`RetryClass::Never`]: the request cannot proceed at all
    ///
    /// # Examples
    ///
    /// ```
    /// use sideline_acquisition::errors::{AcquisitionError, RetryClass};
    ///
    /// let error = AcquisitionError::RemoteRateLimited { provider: "openweather".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = AcquisitionError::Auth {
    ///     provider: "accuweather".to_string(),
    ///     message: "invalid api key".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::NextProvider);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Network { .. }
            | Self::Timeout { .. }
            | Self::RemoteRateLimited { .. }
            | Self::SessionExpired { .. }
            | Self::ServerError { .. } => RetryClass::WithBackoff,

            Self::Parse { transient, .. } => {
                if *transient {
                    RetryClass::WithBackoff
                } else {
                    RetryClass::NextProvider
                }
            }

            Self::Auth { .. }
            | Self::BadRequest { .. }
            | Self::SchemaMismatch { .. }
            | Self::RetriesExhausted { .. } => RetryClass::NextProvider,

            Self::AllProvidersFailed { .. }
            | Self::NoProvidersConfigured { .. }
            | Self::UnknownProvider { .. }
            | Self::InvalidConfig { .. } => RetryClass::Never,
        }
    }

    /// The provider this error is attributed to, if any.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Network { provider, .. }
            | Self::Timeout { provider }
            | Self::RemoteRateLimited { provider }
            | Self::SessionExpired { provider }
            | Self::ServerError { provider, .. }
            | Self::Auth { provider, .. }
            | Self::BadRequest { provider, .. }
            | Self::Parse { provider, .. }
            | Self::SchemaMismatch { provider, .. }
            | Self::RetriesExhausted { provider, .. }
            | Self::UnknownProvider { provider } => Some(provider),
            Self::AllProvidersFailed { .. }
            | Self::NoProvidersConfigured { .. }
            | Self::InvalidConfig { .. } => None,
        }
    }
}

/// A provider's terminal failure inside a fallback chain.
#[derive(Clone, Debug, Serialize)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    #[serde(serialize_with = "serialize_display")]
    pub error: AcquisitionError,
}

impl ProviderFailure {
    pub fn new(provider: ProviderId, error: AcquisitionError) -> Self {
        Self { provider, error }
    }
}

fn summarize(failures: &[ProviderFailure]) -> String {
    if failures.is_empty() {
        return "no provider was attempted".to_string();
    }
    failures
        .iter()
        .map(|f| format!("{}: {}", f.provider, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

fn serialize_display<S>(error: &AcquisitionError, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(error)
}
