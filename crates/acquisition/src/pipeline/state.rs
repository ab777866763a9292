//! Per-request acquisition state machine.
//!
//! ```text
//! Idle -> RateLimiting -> Fetching -> (RetryWait <-> Fetching)* -> Normalizing -> Validating -> Done
//!                                                                                            \-> Failed
//! ```

use std::fmt;

use log::debug;
use serde::Serialize;

/// Where a request currently is.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionState {
    Idle,
    RateLimiting,
    Fetching,
    RetryWait,
    Normalizing,
    Validating,
    Done,
    Failed,
}

impl AcquisitionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AcquisitionState::Done | AcquisitionState::Failed)
    }
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::RateLimiting => "rate_limiting",
            AcquisitionState::Fetching => "fetching",
            AcquisitionState::RetryWait => "retry_wait",
            AcquisitionState::Normalizing => "normalizing",
            AcquisitionState::Validating => "validating",
            AcquisitionState::Done => "done",
            AcquisitionState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The states one request passed through, in order.
///
/// Owned by the request that created it; falling back to another provider
/// re-enters `RateLimiting`.
#[derive(Clone, Debug, Serialize)]
pub struct StateTrace {
    states: Vec<AcquisitionState>,
}

impl StateTrace {
    pub fn new() -> Self {
        Self {
            states: vec![AcquisitionState::Idle],
        }
    }

    /// Move to a new state. Entering the current state again is a no-op.
    pub fn enter(&mut self, state: AcquisitionState) {
        let current = self.current();
        if current == state {
            return;
        }
        debug!("Acquisition state: {} -> {}", current, state);
        self.states.push(state);
    }

    pub fn current(&self) -> AcquisitionState {
        self.states
            .last()
            .copied()
            .unwrap_or(AcquisitionState::Idle)
    }

    pub fn states(&self) -> &[AcquisitionState] {
        &self.states
    }

    /// How many times a state was entered.
    pub fn count(&self, state: AcquisitionState) -> usize {
        self.states.iter().filter(|s| **s == state).count()
    }
}

impl Default for StateTrace {
    fn default() -> Self {
        Self::new()
    }
}
