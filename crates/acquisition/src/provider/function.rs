//! Adapter around an async function.
//!
//! Scraping engines and other external collaborators hand records to the
//! core as "a function that returns raw records or fails". `FnAdapter`
//! gives such a function an identity, a class and the request kinds it
//! serves.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

use super::capabilities::ProviderClass;
use super::traits::ProviderAdapter;
use crate::errors::AcquisitionError;
use crate::models::{AcquisitionRequest, RawRecord, RequestKind};

/// A [`ProviderAdapter`] backed by a closure.
pub struct FnAdapter<F> {
    id: String,
    class: ProviderClass,
    kinds: Vec<RequestKind>,
    fetch: F,
}

impl<F, Fut> FnAdapter<F>
where
    F: Fn(AcquisitionRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<RawRecord>, AcquisitionError>> + Send + 'static,
{
    /// Create an adapter for a REST-class source.
    pub fn new(id: impl Into<String>, kinds: &[RequestKind], fetch: F) -> Self {
        Self {
            id: id.into(),
            class: ProviderClass::RestApi,
            kinds: kinds.to_vec(),
            fetch,
        }
    }

    /// Change the provider class (and with it the default spacing).
    pub fn with_class(mut self, class: ProviderClass) -> Self {
        self.class = class;
        self
    }
}

#[async_trait]
impl<F, Fut> ProviderAdapter for FnAdapter<F>
where
    F: Fn(AcquisitionRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<RawRecord>, AcquisitionError>> + Send + 'static,
{
    fn id(&self) -> &str {
        &self.id
    }

    fn class(&self) -> ProviderClass {
        self.class
    }

    fn request_kinds(&self) -> &[RequestKind] {
        &self.kinds
    }

    async fn fetch(&self, request: &AcquisitionRequest) -> Result<Vec<RawRecord>, AcquisitionError> {
        (self.fetch)(request.clone()).await
    }
}

impl<F> fmt::Debug for FnAdapter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAdapter")
            .field("id", &self.id)
            .field("class", &self.class)
            .field("kinds", &self.kinds)
            .finish()
    }
}
