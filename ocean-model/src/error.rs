//! Validation errors raised when constructing domain values.

use thiserror::Error;

/// Result alias for constructors in this crate.
pub type Result<T> = std::result::Result<T, ModelError>;

#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    /// Latitude, longitude or depth outside its physical range.
    #[error("[Ocean Model] {field} out of range: {value}")]
    CoordinateOutOfRange { field: &'static str, value: f64 },

    /// Bounding box corners are inverted or not finite.
    #[error("[Ocean Model] invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Depth range with `min > max` or beyond the deepest trench.
    #[error("[Ocean Model] invalid depth range {min}..{max}")]
    InvalidDepthRange { min: f64, max: f64 },

    /// Time range with `start > end`.
    #[error("[Ocean Model] time range start is after end")]
    InvalidTimeRange,

    /// Unknown enum label (role, intent, variable).
    #[error("[Ocean Model] unknown {kind}: {value}")]
    UnknownLabel { kind: &'static str, value: String },
}
