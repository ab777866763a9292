//! Top-level request orchestration.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::AcquisitionConfig;
use crate::errors::AcquisitionError;
use crate::models::{AcquisitionRequest, NormalizedRecord, RequestKind};
use crate::pipeline::{AcquisitionState, FallbackChain, Provenance, RateLimiter, StateTrace};
use crate::provider::{ProviderAdapter, ProviderClass, RateLimit};
use crate::validate::{RosterSource, ValidationMode, ValidationVerdict, Validator};

/// Everything one request produced.
#[derive(Clone, Debug, Serialize)]
pub struct AcquisitionResult {
    /// Records that passed every rule.
    pub accepted: Vec<NormalizedRecord>,
    /// Non-strict mode only: failing records with their warnings.
    pub quarantined: Vec<(NormalizedRecord, Vec<String>)>,
    /// Strict mode only: the reasons each dropped record failed.
    pub rejected: Vec<Vec<String>>,
    pub provenance: Vec<Provenance>,
    pub trace: StateTrace,
}

impl AcquisitionResult {
    fn new(provenance: Provenance) -> Self {
        Self {
            accepted: Vec::new(),
            quarantined: Vec::new(),
            rejected: Vec::new(),
            provenance: vec![provenance],
            trace: StateTrace::new(),
        }
    }

    /// No record was admitted, accepted or quarantined.
    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty() && self.quarantined.is_empty()
    }

    /// The provider that served the request.
    pub fn winner(&self) -> Option<&str> {
        self.provenance.iter().find_map(|p| p.winner.as_deref())
    }

    /// Accepted records followed by quarantined ones, warnings dropped.
    pub fn into_admitted(self) -> Vec<NormalizedRecord> {
        let mut admitted = self.accepted;
        admitted.extend(self.quarantined.into_iter().map(|(record, _)| record));
        admitted
    }

    fn admit(&mut self, verdict: ValidationVerdict) {
        match verdict {
            ValidationVerdict::Accepted(record) => self.accepted.push(record),
            ValidationVerdict::Quarantined(record, warnings) => {
                self.quarantined.push((record, warnings))
            }
            ValidationVerdict::Rejected(reasons) => self.rejected.push(reasons),
        }
    }
}

/// Drives requests through rate limiting, retry, fallback, normalization
/// and validation.
///
/// One fallback chain per request kind is built at construction from the
/// configured preference order. The rate limiter is shared by every chain,
/// so an adapter serving several kinds is spaced as one identity.
pub struct AcquisitionCoordinator {
    config: AcquisitionConfig,
    rate_limiter: Arc<RateLimiter>,
    chains: HashMap<RequestKind, FallbackChain>,
    validator: Validator,
}

impl AcquisitionCoordinator {
    /// Build a coordinator over `adapters`.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` when the configuration fails validation, two
    ///   adapters share an id, or a preference list names an adapter for a
    ///   kind it does not serve
    /// - `UnknownProvider` when a preference list names an adapter that was
    ///   not supplied
    pub fn new(
        config: AcquisitionConfig,
        adapters: Vec<Arc<dyn ProviderAdapter>>,
    ) -> Result<Self, AcquisitionError> {
        config.validate()?;

        let mut by_id: HashMap<&str, &Arc<dyn ProviderAdapter>> = HashMap::new();
        for adapter in &adapters {
            if by_id.insert(adapter.id(), adapter).is_some() {
                return Err(AcquisitionError::InvalidConfig {
                    message: format!("provider '{}' is registered twice", adapter.id()),
                });
            }
        }

        let rate_limiter = Arc::new(RateLimiter::with_default_delay(
            config.class_delay(ProviderClass::RestApi),
        ));
        for adapter in &adapters {
            let delay = spacing_for(&config, adapter.as_ref());
            debug!("Provider '{}' spaced at {:?}", adapter.id(), delay);
            rate_limiter.configure(&Cow::Owned(adapter.id().to_string()), delay);
        }

        let mut chains = HashMap::new();
        for kind in RequestKind::ALL {
            let ordered = match config.preference_for(kind) {
                Some(ids) => ids
                    .iter()
                    .map(|id| {
                        let adapter = by_id.get(id.as_str()).ok_or_else(|| {
                            AcquisitionError::UnknownProvider {
                                provider: id.clone(),
                            }
                        })?;
                        if !adapter.supports(kind) {
                            return Err(AcquisitionError::InvalidConfig {
                                message: format!(
                                    "provider '{}' does not serve {} requests",
                                    id, kind
                                ),
                            });
                        }
                        Ok(Arc::clone(*adapter))
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None => adapters
                    .iter()
                    .filter(|a| a.supports(kind))
                    .cloned()
                    .collect(),
            };

            let chain = FallbackChain::new(kind, ordered, Arc::clone(&rate_limiter))
                .with_retry_policy(config.retry_policy())
                .with_fetch_timeout(config.fetch_timeout_duration());
            info!(
                "Fallback chain for {} requests: {:?}",
                kind,
                chain.provider_ids()
            );
            chains.insert(kind, chain);
        }

        Ok(Self {
            config,
            rate_limiter,
            chains,
            validator: Validator::new(),
        })
    }

    /// Check team identities against `roster`.
    pub fn with_roster(mut self, roster: Arc<dyn RosterSource>) -> Self {
        self.validator = self.validator.with_roster(roster);
        self
    }

    /// Replace the validator (thresholds, roster).
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// The limiter shared by every provider.
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Provider ids tried for `kind`, in order.
    pub fn providers_for(&self, kind: RequestKind) -> Vec<&str> {
        self.chains
            .get(&kind)
            .map(FallbackChain::provider_ids)
            .unwrap_or_default()
    }

    /// Acquire under the configured validation mode.
    pub async fn acquire(
        &self,
        request: &AcquisitionRequest,
    ) -> Result<AcquisitionResult, AcquisitionError> {
        self.acquire_with_mode(request, self.config.validation_mode).await
    }

    /// Acquire one request.
    ///
    /// Fails only when no provider could deliver normalizable records.
    /// Validation failures never fail the request; they decide which
    /// bucket each record lands in.
    pub async fn acquire_with_mode(
        &self,
        request: &AcquisitionRequest,
        mode: ValidationMode,
    ) -> Result<AcquisitionResult, AcquisitionError> {
        let kind = request.kind();
        let chain = self
            .chains
            .get(&kind)
            .ok_or(AcquisitionError::NoProvidersConfigured { kind })?;

        let mut trace = StateTrace::new();
        let outcome = match chain.resolve_traced(request, &mut trace).await {
            Ok(outcome) => outcome,
            Err(e) => {
                trace.enter(AcquisitionState::Failed);
                warn!("Acquisition of {} failed: {}", request, e);
                debug!("State path for {}: {:?}", request, trace.states());
                return Err(e);
            }
        };

        trace.enter(AcquisitionState::Validating);
        let (records, provenance) = outcome.into_parts();
        let total = records.len();
        let mut result = AcquisitionResult::new(provenance);
        for record in records {
            result.admit(self.validator.validate(record, mode));
        }
        trace.enter(AcquisitionState::Done);
        result.trace = trace;

        info!(
            "Acquired {} from '{}': {} records, {} accepted, {} quarantined, {} rejected",
            request,
            result.winner().unwrap_or("unknown"),
            total,
            result.accepted.len(),
            result.quarantined.len(),
            result.rejected.len()
        );
        Ok(result)
    }

    /// Acquire several requests concurrently. Results come back in input order.
    pub async fn acquire_all(
        &self,
        requests: &[AcquisitionRequest],
    ) -> Vec<Result<AcquisitionResult, AcquisitionError>> {
        join_all(requests.iter().map(|request| self.acquire(request))).await
    }
}

/// Spacing for an adapter: a configured override, else a limit the adapter
/// declares itself, else the configured default for its class.
fn spacing_for(config: &AcquisitionConfig, adapter: &dyn ProviderAdapter) -> Duration {
    if let Some(delay) = config.rate_limit_override(adapter.id()) {
        return delay;
    }
    let declared = adapter.rate_limit();
    if declared != RateLimit::for_class(adapter.class()) {
        return declared.min_delay;
    }
    config.class_delay(adapter.class())
}
