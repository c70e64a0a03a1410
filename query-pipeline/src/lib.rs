//! Natural-language ocean data questions, end to end.
//!
//! - [`extract`]: question → validated [`Query`](ocean_model::Query), keyword fallback.
//! - [`compose`]: role-aware answer with a statistics template fallback.
//! - [`viz`]: decision-table visualization with a table fallback.
//! - [`Orchestrator`]: state machine, deadline, data ∥ knowledge fan-out, response cache.

pub mod cache;
pub mod cfg;
pub mod compose;
pub mod error;
pub mod export;
pub mod extract;
mod pipeline;
pub mod state;
pub mod viz;

pub use cache::{CacheKey, ResponseCache};
pub use cfg::PipelineConfig;
pub use compose::{Composition, ResponseComposer};
pub use error::{
    CompositionFailure, ExtractionError, OrchestratorError, Result, VisualizationBuildFailure,
};
pub use extract::{Extraction, ParameterExtractor};
pub use pipeline::Orchestrator;
pub use state::{RequestState, RequestTracker};
pub use viz::{Selection, VisualizationSelector};
