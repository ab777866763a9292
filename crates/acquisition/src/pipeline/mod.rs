//! Request pipeline.
//!
//! This module provides the network-facing half of acquisition:
//! - Minimum spacing per provider identity
//! - Bounded exponential-backoff retry of a single provider call
//! - Ordered fallback across equivalent providers, with provenance
//! - The per-request state machine trace

mod fallback;
mod provenance;
mod rate_limiter;
mod retry;
mod state;

pub use fallback::{FallbackChain, FallbackOutcome, DEFAULT_FETCH_TIMEOUT};
pub use provenance::{Provenance, ProviderAttempt};
pub use rate_limiter::RateLimiter;
pub use retry::{RetryPolicy, RetryStats, DEFAULT_BASE_DELAY, DEFAULT_MAX_RETRIES, DEFAULT_MULTIPLIER};
pub use state::{AcquisitionState, StateTrace};
