//! Provider attempt tracking for fallback diagnostics.

use serde::Serialize;

use super::retry::RetryStats;
use crate::errors::{AcquisitionError, ProviderFailure};
use crate::models::ProviderId;

/// Record of a single provider attempt during a fallback run.
#[derive(Clone, Debug, Serialize)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub stats: RetryStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

/// Which provider served a request, and what happened to the ones before it.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Provenance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<ProviderId>,
    pub attempts: Vec<ProviderAttempt>,
    #[serde(skip)]
    failures: Vec<ProviderFailure>,
}

impl Provenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, provider_id: ProviderId, stats: RetryStats, error: AcquisitionError) {
        self.attempts.push(ProviderAttempt {
            provider_id: provider_id.clone(),
            stats,
            error: Some(error.to_string()),
            success: false,
        });
        self.failures.push(ProviderFailure::new(provider_id, error));
    }

    pub fn record_success(&mut self, provider_id: ProviderId, stats: RetryStats) {
        self.attempts.push(ProviderAttempt {
            provider_id: provider_id.clone(),
            stats,
            error: None,
            success: true,
        });
        self.winner = Some(provider_id);
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match &a.error {
                Some(err) => format!("{}: ERROR ({})", a.provider_id, err),
                None => format!("{}: SUCCESS", a.provider_id),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Terminal failures of every provider tried before the winner.
    pub fn failures(&self) -> &[ProviderFailure] {
        &self.failures
    }

    pub(crate) fn into_failures(self) -> Vec<ProviderFailure> {
        self.failures
    }
}
