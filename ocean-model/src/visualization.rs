//! Visualization specification handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VizKind {
    Map,
    TimeSeries,
    DepthProfile,
    Comparison,
    Table,
}

impl VizKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VizKind::Map => "map",
            VizKind::TimeSeries => "time_series",
            VizKind::DepthProfile => "depth_profile",
            VizKind::Comparison => "comparison",
            VizKind::Table => "table",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub float_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<Utc>,
    /// Mean of all samples sharing this timestamp.
    pub value: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfilePoint {
    pub depth: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonGroup {
    pub label: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// Kind-specific data. The variant determines the [`VizKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VizPayload {
    Map {
        variable: String,
        points: Vec<MapPoint>,
        /// `(latitude, longitude)` of the point cloud centroid.
        center: (f64, f64),
        value_range: (f64, f64),
    },
    TimeSeries {
        variable: String,
        series: Vec<SeriesPoint>,
    },
    DepthProfile {
        variable: String,
        profile: Vec<ProfilePoint>,
    },
    Comparison {
        variable: String,
        groups: Vec<ComparisonGroup>,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl VizPayload {
    pub fn kind(&self) -> VizKind {
        match self {
            VizPayload::Map { .. } => VizKind::Map,
            VizPayload::TimeSeries { .. } => VizKind::TimeSeries,
            VizPayload::DepthProfile { .. } => VizKind::DepthProfile,
            VizPayload::Comparison { .. } => VizKind::Comparison,
            VizPayload::Table { .. } => VizKind::Table,
        }
    }

    /// Number of plotted items (points, rows, groups).
    pub fn len(&self) -> usize {
        match self {
            VizPayload::Map { points, .. } => points.len(),
            VizPayload::TimeSeries { series, .. } => series.len(),
            VizPayload::DepthProfile { profile, .. } => profile.len(),
            VizPayload::Comparison { groups, .. } => groups.len(),
            VizPayload::Table { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable once built: fields are private and `kind` always matches `payload`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizationSpec {
    kind: VizKind,
    title: String,
    payload: VizPayload,
}

impl VisualizationSpec {
    pub fn new(title: impl Into<String>, payload: VizPayload) -> Self {
        Self {
            kind: payload.kind(),
            title: title.into(),
            payload,
        }
    }

    pub fn kind(&self) -> VizKind {
        self.kind
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn payload(&self) -> &VizPayload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_payload() {
        let spec = VisualizationSpec::new(
            "t",
            VizPayload::Table {
                columns: vec!["a".into()],
                rows: vec![],
            },
        );
        assert_eq!(spec.kind(), VizKind::Table);
        assert!(spec.payload().is_empty());

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["kind"], "table");
        assert_eq!(json["payload"]["type"], "table");
    }
}
