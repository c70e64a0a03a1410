//! Domain model shared by every stage of the FloatChat pipeline.
//!
//! Types here carry their own invariants: coordinates are range-checked on
//! construction, depth and time ranges are ordered, and a [`Record`] can only
//! be produced by stamping a validated [`Observation`] with its source.

mod envelope;
mod error;
mod knowledge;
mod query;
mod record;
mod region;
mod variable;
mod visualization;

pub use envelope::{Provenance, QcSummary, RequestStatus, ResponseEnvelope};
pub use error::{ModelError, Result};
pub use knowledge::KnowledgeSnippet;
pub use query::{DepthRange, Intent, MAX_OCEAN_DEPTH_M, Query, TimeRange, UserRole};
pub use record::{DataSource, Observation, QcFlag, Record};
pub use region::{BoundingBox, NamedSea, Region};
pub use variable::Variable;
pub use visualization::{
    ComparisonGroup, MapPoint, ProfilePoint, SeriesPoint, VisualizationSpec, VizKind, VizPayload,
};
