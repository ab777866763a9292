//! Bounded exponential-backoff retry around a single provider call.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use serde::Serialize;

use super::state::{AcquisitionState, StateTrace};
use crate::errors::{AcquisitionError, RetryClass};
use crate::models::ProviderId;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Growth factor between consecutive retry delays.
pub const DEFAULT_MULTIPLIER: u32 = 2;

/// Attempt bookkeeping for one `execute` call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RetryStats {
    /// Calls made to the operation, including the first.
    pub attempts: u32,
    /// Total time spent sleeping between attempts.
    pub total_delay: Duration,
}

/// Retry policy for provider calls.
///
/// Makes at most `max_retries + 1` attempts. Retryable failures
/// ([`RetryClass::WithBackoff`]) sleep `base * multiplier^n` before the next
/// attempt (1s, 2s, 4s, ... by default). Anything else is returned on the
/// spot without touching the remaining budget.
///
/// Sleeping is a tokio timer, so other tasks keep running and dropping the
/// future stops the loop before any further call.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
    multiplier: u32,
}

/// Per-call state, discarded when `execute` returns.
struct RetryState {
    attempt: u32,
    next_delay: Duration,
    last_error: Option<AcquisitionError>,
    stats: RetryStats,
}

impl RetryPolicy {
    /// Create a policy with the default 1s base delay and doubling backoff.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }

    /// Replace the backoff curve. A multiplier of 0 is treated as 1.
    pub fn with_backoff(mut self, base_delay: Duration, multiplier: u32) -> Self {
        self.base_delay = base_delay;
        self.multiplier = multiplier.max(1);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay slept before retry number `retry` (0-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.multiplier.saturating_pow(retry))
    }

    /// Run `operation` under this policy.
    pub async fn execute<T, F, Fut>(
        &self,
        provider: &ProviderId,
        operation: F,
    ) -> Result<T, AcquisitionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AcquisitionError>>,
    {
        self.execute_with_stats(provider, operation).await.0
    }

    /// Run `operation` and report how many attempts and how much backoff it took.
    pub async fn execute_with_stats<T, F, Fut>(
        &self,
        provider: &ProviderId,
        operation: F,
    ) -> (Result<T, AcquisitionError>, RetryStats)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AcquisitionError>>,
    {
        let mut trace = StateTrace::new();
        self.execute_traced(provider, &mut trace, operation).await
    }

    /// Like [`execute_with_stats`](Self::execute_with_stats), also recording
    /// `Fetching` and `RetryWait` transitions in `trace`.
    pub async fn execute_traced<T, F, Fut>(
        &self,
        provider: &ProviderId,
        trace: &mut StateTrace,
        mut operation: F,
    ) -> (Result<T, AcquisitionError>, RetryStats)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AcquisitionError>>,
    {
        let mut state = RetryState {
            attempt: 0,
            next_delay: self.delay_for_retry(0),
            last_error: None,
            stats: RetryStats::default(),
        };

        loop {
            trace.enter(AcquisitionState::Fetching);
            state.stats.attempts += 1;

            let error = match operation().await {
                Ok(value) => {
                    if state.attempt > 0 {
                        debug!(
                            "Provider '{}' succeeded on attempt {} after {:?} of backoff",
                            provider, state.stats.attempts, state.stats.total_delay
                        );
                    }
                    return (Ok(value), state.stats);
                }
                Err(e) => e,
            };

            if error.retry_class() != RetryClass::WithBackoff {
                debug!(
                    "Provider '{}' failed with non-retryable error on attempt {}: {}",
                    provider, state.stats.attempts, error
                );
                return (Err(error), state.stats);
            }

            if state.attempt >= self.max_retries {
                state.last_error = Some(error);
                break;
            }

            warn!(
                "Provider '{}' attempt {}/{} failed: {}. Retrying in {:?}",
                provider,
                state.stats.attempts,
                self.max_retries.saturating_add(1),
                error,
                state.next_delay
            );
            state.last_error = Some(error);

            trace.enter(AcquisitionState::RetryWait);
            tokio::time::sleep(state.next_delay).await;
            state.stats.total_delay += state.next_delay;
            state.attempt += 1;
            state.next_delay = self.delay_for_retry(state.attempt);
        }

        let last_error = state
            .last_error
            .unwrap_or_else(|| AcquisitionError::Timeout {
                provider: provider.to_string(),
            });
        warn!(
            "Provider '{}' exhausted {} attempts: {}",
            provider, state.stats.attempts, last_error
        );
        (
            Err(AcquisitionError::RetriesExhausted {
                provider: provider.to_string(),
                attempts: state.stats.attempts,
                source: Box::new(last_error),
            }),
            state.stats,
        )
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn provider() -> ProviderId {
        Cow::Borrowed("MOCK")
    }

    fn network_error() -> AcquisitionError {
        AcquisitionError::Network {
            provider: "MOCK".to_string(),
            message: "connection reset".to_string(),
        }
    }

    #[test]
    fn test_default_backoff_sequence() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_retry(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_retry(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for_retry(4), Duration::from_secs(16));
    }

    #[test]
    fn test_backoff_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::default();
        assert!(policy.delay_for_retry(200) >= policy.delay_for_retry(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_failure_uses_full_budget() {
        let policy = RetryPolicy::new(3);
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let (result, stats) = policy
            .execute_with_stats(&provider(), || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(network_error())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(stats.attempts, 4);
        assert_eq!(stats.total_delay, Duration::from_secs(7));
        assert_eq!(start.elapsed(), Duration::from_secs(7));

        match result {
            Err(AcquisitionError::RetriesExhausted { attempts, source, .. }) => {
                assert_eq!(attempts, 4);
                assert!(matches!(*source, AcquisitionError::Network { .. }));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_failure_makes_one_attempt() {
        let policy = RetryPolicy::new(3);
        let calls = Arc::new(AtomicU32::new(0));

        let (result, stats) = policy
            .execute_with_stats(&provider(), || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(AcquisitionError::Auth {
                        provider: "MOCK".to_string(),
                        message: "invalid key".to_string(),
                    })
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(stats.total_delay, Duration::ZERO);
        assert!(matches!(result, Err(AcquisitionError::Auth { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3);
        let calls = Arc::new(AtomicU32::new(0));
        let mut trace = StateTrace::new();

        let (result, stats) = policy
            .execute_traced(&provider(), &mut trace, || {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AcquisitionError::ServerError {
                            provider: "MOCK".to_string(),
                            status: 502,
                        })
                    } else {
                        Ok("payload")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "payload");
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.total_delay, Duration::from_secs(3));
        assert_eq!(trace.count(AcquisitionState::RetryWait), 2);
        assert_eq!(trace.count(AcquisitionState::Fetching), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0);
        let (result, stats) = policy
            .execute_with_stats(&provider(), || async { Err::<(), _>(network_error()) })
            .await;

        assert_eq!(stats.attempts, 1);
        assert!(matches!(
            result,
            Err(AcquisitionError::RetriesExhausted { attempts: 1, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_mid_backoff_stops_further_calls() {
        let policy = RetryPolicy::new(3);
        let calls = Arc::new(AtomicU32::new(0));

        let counted = Arc::clone(&calls);
        let abandoned = tokio::time::timeout(
            Duration::from_millis(1500),
            policy.execute(&provider(), move || {
                let calls = Arc::clone(&counted);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(network_error())
                }
            }),
        )
        .await;
        assert!(abandoned.is_err());

        // Two calls happened (t=0 and t=1s); nothing runs after cancellation.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
