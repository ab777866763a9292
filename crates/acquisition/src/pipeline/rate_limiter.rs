//! Minimum-spacing rate limiter for providers.
//!
//! Each provider identity gets its own "last dispatch" timestamp. A caller
//! may dispatch once at least the configured delay has passed since the
//! previous dispatch for the same identity. Identities never wait on each
//! other.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::models::ProviderId;

/// Default spacing between requests to one provider.
const DEFAULT_DELAY: Duration = Duration::from_secs(1);

/// Per-provider request spacing.
///
/// State for an identity is created on its first successful acquire and
/// lives as long as the limiter. Waiting callers hold no lock, so dropping
/// an `acquire` future mid-wait leaves the identity untouched.
pub struct RateLimiter {
    /// Last successful acquire per provider.
    last_acquired: Mutex<HashMap<String, Instant>>,
    /// Per-provider delay overrides.
    delays: Mutex<HashMap<String, Duration>>,
    /// Delay for providers without an override.
    default_delay: Duration,
}

impl RateLimiter {
    /// Create a rate limiter with the default one second spacing.
    pub fn new() -> Self {
        Self::with_default_delay(DEFAULT_DELAY)
    }

    /// Create a rate limiter with a custom default spacing.
    pub fn with_default_delay(default_delay: Duration) -> Self {
        Self {
            last_acquired: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            default_delay,
        }
    }

    /// Lock the timestamps mutex, recovering from poison if necessary.
    ///
    /// A poisoned map still holds valid instants; the worst case is one
    /// request spaced slightly off.
    fn lock_last_acquired(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.last_acquired.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter timestamps mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Lock the delays mutex, recovering from poison if necessary.
    fn lock_delays(&self) -> MutexGuard<'_, HashMap<String, Duration>> {
        self.delays.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter delays mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set the minimum spacing for a specific provider.
    pub fn configure(&self, provider: &ProviderId, delay: Duration) {
        self.lock_delays().insert(provider.to_string(), delay);
    }

    /// The spacing that applies to a provider.
    pub fn delay_for(&self, provider: &ProviderId) -> Duration {
        self.lock_delays()
            .get(provider.as_ref())
            .copied()
            .unwrap_or(self.default_delay)
    }

    /// Wait until the provider may be called, then record the dispatch.
    ///
    /// The check and the update happen under one lock, so two concurrent
    /// callers can never both pass inside the same window.
    pub async fn acquire(&self, provider: &ProviderId) {
        let delay = self.delay_for(provider);

        loop {
            let wait_time = {
                let mut last_acquired = self.lock_last_acquired();
                let now = Instant::now();

                match last_acquired.get(provider.as_ref()) {
                    Some(last) if now.duration_since(*last) < delay => {
                        delay - now.duration_since(*last)
                    }
                    _ => {
                        last_acquired.insert(provider.to_string(), now);
                        debug!("Rate limiter: acquired slot for '{}'", provider);
                        return;
                    }
                }
            };

            debug!(
                "Rate limiter: waiting {:?} for provider '{}'",
                wait_time, provider
            );
            tokio::time::sleep(wait_time).await;
        }
    }

    /// Try to acquire without waiting.
    ///
    /// Returns true and records the dispatch if the provider is ready.
    pub fn try_acquire(&self, provider: &ProviderId) -> bool {
        let delay = self.delay_for(provider);
        let mut last_acquired = self.lock_last_acquired();
        let now = Instant::now();

        match last_acquired.get(provider.as_ref()) {
            Some(last) if now.duration_since(*last) < delay => false,
            _ => {
                last_acquired.insert(provider.to_string(), now);
                true
            }
        }
    }

    /// How long a caller would have to wait right now.
    pub fn time_until_ready(&self, provider: &ProviderId) -> Duration {
        let delay = self.delay_for(provider);
        let last_acquired = self.lock_last_acquired();

        last_acquired
            .get(provider.as_ref())
            .map(|last| delay.saturating_sub(Instant::now().duration_since(*last)))
            .unwrap_or(Duration::ZERO)
    }

    /// When the provider was last dispatched, if ever.
    pub fn last_acquired(&self, provider: &ProviderId) -> Option<Instant> {
        self.lock_last_acquired().get(provider.as_ref()).copied()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
