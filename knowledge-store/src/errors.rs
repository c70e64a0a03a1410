//! Unified error type for knowledge retrieval.

use std::time::Duration;

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RagError {
    /// Embedding backend failed.
    #[error("embedding error: {0}")]
    Embedding(#[from] AiLlmError),

    /// Embedding has a different size than the index expects.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// Stored payload did not match the expected document shape.
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Retrieval exceeded its time budget.
    #[error("retrieval timed out after {0:?}")]
    Timeout(Duration),
}
