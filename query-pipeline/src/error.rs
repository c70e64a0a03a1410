//! Pipeline error taxonomy.
//!
//! Only [`ExtractionError`] aborts a request (surfaced as
//! [`OrchestratorError::Extraction`]); data unavailability becomes a failed
//! envelope, and every other failure is absorbed into a warning.

use std::time::Duration;

use ai_llm_service::AiLlmError;
use ocean_model::VizKind;
use thiserror::Error;

use crate::state::RequestState;

/// Convenient alias for orchestrator results.
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// The generation call behind extraction failed in a way retrying cannot fix.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("[Query Pipeline] parameter extraction failed: {0}")]
    Generation(#[source] AiLlmError),
}

/// Answer generation failed; the composer falls back to a template.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CompositionFailure {
    #[error("answer generation failed: {0}")]
    Generation(#[from] AiLlmError),

    #[error("answer generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("answer generation returned empty text")]
    Empty,
}

/// The chosen visualization could not be built; the selector degrades to a table.
#[derive(Debug, Error)]
pub enum VisualizationBuildFailure {
    #[error("no record carries a usable value for the {} view ({dropped} dropped)", .kind.as_str())]
    EmptyPayload { kind: VizKind, dropped: usize },
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("[Query Pipeline] illegal state transition {from:?} -> {to:?}")]
    IllegalTransition { from: RequestState, to: RequestState },
}
