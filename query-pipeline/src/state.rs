//! Per-request state machine.
//!
//! `Received → Extracting → FetchingAndRetrieving → Composing → Visualizing → Done`,
//! with `Failed` reachable from any non-terminal state.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::error::OrchestratorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Received,
    Extracting,
    FetchingAndRetrieving,
    Composing,
    Visualizing,
    Done,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Done | RequestState::Failed)
    }

    /// Whether `self → next` is a legal edge.
    pub fn can_advance_to(&self, next: RequestState) -> bool {
        use RequestState::*;
        match (self, next) {
            (s, Failed) => !s.is_terminal(),
            (Received, Extracting)
            | (Extracting, FetchingAndRetrieving)
            | (FetchingAndRetrieving, Composing)
            | (Composing, Visualizing)
            | (Visualizing, Done) => true,
            _ => false,
        }
    }
}

/// Tracks one request's progress and logs every transition.
#[derive(Debug)]
pub struct RequestTracker {
    state: RequestState,
    started: Instant,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestTracker {
    pub fn new() -> Self {
        Self {
            state: RequestState::Received,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// # Errors
    /// [`OrchestratorError::IllegalTransition`] when `next` is not reachable.
    pub fn advance(&mut self, next: RequestState) -> Result<(), OrchestratorError> {
        if !self.state.can_advance_to(next) {
            return Err(OrchestratorError::IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        debug!(
            from = ?self.state,
            to = ?next,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "request state"
        );
        self.state = next;
        Ok(())
    }
}
