//! Ordered provider fallback.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use super::provenance::Provenance;
use super::rate_limiter::RateLimiter;
use super::retry::{RetryPolicy, RetryStats};
use super::state::{AcquisitionState, StateTrace};
use crate::errors::{AcquisitionError, ProviderFailure, RetryClass};
use crate::models::{AcquisitionRequest, NormalizedRecord, ProviderId, RawRecord, RequestKind};
use crate::normalize::normalize_all;
use crate::provider::ProviderAdapter;

/// Deadline for a single fetch attempt.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// The records one provider delivered, and who failed before it.
#[derive(Clone, Debug, Serialize)]
pub struct FallbackOutcome {
    winner: ProviderId,
    records: Vec<NormalizedRecord>,
    provenance: Provenance,
}

impl FallbackOutcome {
    /// The provider that served the request.
    pub fn winner(&self) -> &str {
        &self.winner
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Terminal failures of the providers tried before the winner.
    pub fn failures(&self) -> &[ProviderFailure] {
        self.provenance.failures()
    }

    pub fn into_parts(self) -> (Vec<NormalizedRecord>, Provenance) {
        (self.records, self.provenance)
    }
}

/// Providers judged equivalent for one kind of request, in preference order.
///
/// The first provider to deliver normalizable records wins. Later providers
/// are not consulted once one succeeds, and nothing is merged or scored.
pub struct FallbackChain {
    kind: RequestKind,
    adapters: Vec<Arc<dyn ProviderAdapter>>,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    fetch_timeout: Duration,
}

impl FallbackChain {
    /// Create a chain with the default retry policy and fetch deadline.
    pub fn new(
        kind: RequestKind,
        adapters: Vec<Arc<dyn ProviderAdapter>>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            kind,
            adapters,
            rate_limiter,
            retry: RetryPolicy::default(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Provider ids in the order they are tried.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.adapters.iter().map(|a| a.id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Resolve `request` against the chain.
    pub async fn resolve(
        &self,
        request: &AcquisitionRequest,
    ) -> Result<FallbackOutcome, AcquisitionError> {
        let mut trace = StateTrace::new();
        self.resolve_traced(request, &mut trace).await
    }

    /// Resolve `request`, recording state transitions in `trace`.
    ///
    /// Providers are tried in order:
    /// 1. Wait for the provider's rate-limit slot
    /// 2. Fetch under the retry policy, each attempt with its own deadline
    /// 3. Normalize the raw records
    /// 4. On failure, record it and move on; a request-level error stops the chain
    pub async fn resolve_traced(
        &self,
        request: &AcquisitionRequest,
        trace: &mut StateTrace,
    ) -> Result<FallbackOutcome, AcquisitionError> {
        if self.adapters.is_empty() {
            return Err(AcquisitionError::NoProvidersConfigured { kind: self.kind });
        }

        let mut provenance = Provenance::new();

        for adapter in &self.adapters {
            let provider_id: ProviderId = Cow::Owned(adapter.id().to_string());
            info!("Fetching {} from provider '{}'", request, provider_id);

            let (fetched, stats) = self
                .fetch_with_retry(adapter.as_ref(), &provider_id, request, trace)
                .await;

            let error = match fetched {
                Ok(raws) => {
                    trace.enter(AcquisitionState::Normalizing);
                    match normalize_all(&raws) {
                        Ok(records) => {
                            info!(
                                "Provider '{}' delivered {} records after {} attempts",
                                provider_id,
                                records.len(),
                                stats.attempts
                            );
                            provenance.record_success(provider_id.clone(), stats);
                            return Ok(FallbackOutcome {
                                winner: provider_id,
                                records,
                                provenance,
                            });
                        }
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            if error.retry_class() == RetryClass::Never {
                info!(
                    "Terminal error from '{}': {}, not trying other providers",
                    provider_id, error
                );
                return Err(error);
            }

            warn!(
                "Provider '{}' failed: {}, trying next provider",
                provider_id, error
            );
            provenance.record_failure(provider_id, stats, error);
        }

        warn!("All providers failed for {}: {}", request, provenance.summary());
        Err(AcquisitionError::AllProvidersFailed {
            failures: provenance.into_failures(),
        })
    }

    /// One provider's fetch. Every attempt, retries included, goes through
    /// the rate limiter first; the deadline covers only the fetch itself.
    async fn fetch_with_retry(
        &self,
        adapter: &dyn ProviderAdapter,
        provider_id: &ProviderId,
        request: &AcquisitionRequest,
        trace: &mut StateTrace,
    ) -> (Result<Vec<RawRecord>, AcquisitionError>, RetryStats) {
        trace.enter(AcquisitionState::RateLimiting);
        self.rate_limiter.acquire(provider_id).await;

        let rate_limiter = self.rate_limiter.as_ref();
        let fetch_timeout = self.fetch_timeout;
        let mut attempt = 0u32;

        self.retry
            .execute_traced(provider_id, trace, || {
                let gated = attempt > 0;
                attempt += 1;
                async move {
                    if gated {
                        rate_limiter.acquire(provider_id).await;
                    }
                    match tokio::time::timeout(fetch_timeout, adapter.fetch(request)).await {
                        Ok(result) => result,
                        Err(_) => Err(AcquisitionError::Timeout {
                            provider: provider_id.to_string(),
                        }),
                    }
                }
            })
            .await
    }
}
