/// Classification for retry policy.
///
/// Used by [`RetryPolicy`](crate::pipeline::RetryPolicy) and
/// [`FallbackChain`](crate::pipeline::FallbackChain) to decide how to react
/// to a failed provider call.
///
/// # Behavior Summary
///
/// | Class | Retry same provider? | Try next provider? |
/// |-------|----------------------|--------------------|
/// | `WithBackoff` | Yes, until the retry budget is spent | Yes, once exhausted |
/// | `NextProvider` | No | Yes |
/// | `Never` | No | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Transient failure: network, timeout, 5xx, remote rate limit or an
    /// expired session. Sleep the backoff delay and call the provider again.
    WithBackoff,

    /// The provider rejected the request or sent data we cannot read.
    /// Calling it again won't help, but an equivalent provider might.
    NextProvider,

    /// The request itself is unusable (no providers, bad configuration).
    /// Nothing downstream should be attempted.
    Never,
}

impl RetryClass {
    /// Whether the failure should consume retry budget on the same provider.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::WithBackoff)
    }
}
