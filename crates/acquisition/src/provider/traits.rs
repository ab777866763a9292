//! Provider adapter trait definition.
//!
//! This module defines the `ProviderAdapter` trait that every external
//! data source is wrapped in before the core will talk to it.

use async_trait::async_trait;

use crate::errors::AcquisitionError;
use crate::models::{AcquisitionRequest, RawRecord, RequestKind};

use super::capabilities::{ProviderClass, RateLimit};

/// Trait for sports data providers.
///
/// Implement this trait to plug a new source (scraper, REST client, file
/// replay) into the acquisition pipeline. The core only ever calls
/// [`fetch`](Self::fetch); transport, credentials and sessions stay inside
/// the adapter.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use sideline_acquisition::provider::{ProviderAdapter, ProviderClass};
///
/// struct MyScraper {
///     session: BrowserSession,
/// }
///
/// #[async_trait]
/// impl ProviderAdapter for MyScraper {
///     fn id(&self) -> &str {
///         "my_scraper"
///     }
///
///     fn class(&self) -> ProviderClass {
///         ProviderClass::Scraper
///     }
///
///     fn request_kinds(&self) -> &[RequestKind] {
///         &[RequestKind::Odds]
///     }
///
///     async fn fetch(&self, request: &AcquisitionRequest) -> Result<Vec<RawRecord>, AcquisitionError> {
///         // ... scrape and return raw rows
///     }
/// }
/// ```
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used for logging, preference lists, provenance, and as the
    /// rate-limit identity.
    fn id(&self) -> &str;

    /// How the provider is reached. Default is [`ProviderClass::RestApi`].
    fn class(&self) -> ProviderClass {
        ProviderClass::RestApi
    }

    /// Request kinds this provider can serve.
    fn request_kinds(&self) -> &[RequestKind];

    /// Rate limiting configuration.
    ///
    /// Defaults to the spacing for the provider's class. Configuration
    /// overrides take precedence over this value.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::for_class(self.class())
    }

    /// Whether this provider can serve the given kind of request.
    fn supports(&self, kind: RequestKind) -> bool {
        self.request_kinds().contains(&kind)
    }

    /// Fetch raw records for a request.
    ///
    /// # Errors
    ///
    /// - `Auth` when credentials are refused
    /// - `Network`, `Timeout`, `ServerError`, `SessionExpired` for transport trouble
    /// - `RemoteRateLimited` when the remote asks us to back off
    /// - `Parse` when the response cannot be read; set `transient` if a
    ///   later attempt may see complete data
    /// - `BadRequest` when the request cannot be served at all
    async fn fetch(&self, request: &AcquisitionRequest) -> Result<Vec<RawRecord>, AcquisitionError>;
}
