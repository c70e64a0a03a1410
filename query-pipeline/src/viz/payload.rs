//! Payload builders, one per visualization kind.
//!
//! Builders skip records without a finite value for the variable and report
//! how many they skipped; they never fail on malformed input.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use ocean_model::{
    ComparisonGroup, MapPoint, ProfilePoint, Record, SeriesPoint, Variable, VizKind, VizPayload,
};

/// Fixed leading columns of the table view; the variable column follows `depth_m`.
pub const TABLE_COLUMNS: [&str; 5] = ["float_id", "latitude", "longitude", "timestamp", "depth_m"];

/// Payload plus the number of records left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct Built {
    pub payload: VizPayload,
    pub dropped: usize,
}

pub fn build(kind: VizKind, variable: Variable, records: &[Record]) -> Built {
    match kind {
        VizKind::Map => map(variable, records),
        VizKind::TimeSeries => time_series(variable, records),
        VizKind::DepthProfile => depth_profile(variable, records),
        VizKind::Comparison => comparison(variable, records),
        VizKind::Table => table(variable, records),
    }
}

fn value_of(r: &Record, variable: Variable) -> Option<f64> {
    r.value(variable).filter(|v| v.is_finite())
}

fn map(variable: Variable, records: &[Record]) -> Built {
    let points: Vec<MapPoint> = records
        .iter()
        .filter_map(|r| {
            Some(MapPoint {
                float_id: r.float_id().to_string(),
                latitude: r.latitude(),
                longitude: r.longitude(),
                value: value_of(r, variable)?,
            })
        })
        .collect();

    let n = points.len().max(1) as f64;
    let center = (
        points.iter().map(|p| p.latitude).sum::<f64>() / n,
        points.iter().map(|p| p.longitude).sum::<f64>() / n,
    );
    let value_range = points
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, p| match acc {
            None => Some((p.value, p.value)),
            Some((lo, hi)) => Some((lo.min(p.value), hi.max(p.value))),
        })
        .unwrap_or((0.0, 0.0));

    Built {
        dropped: records.len() - points.len(),
        payload: VizPayload::Map {
            variable: variable.as_str().into(),
            points,
            center,
            value_range,
        },
    }
}

fn time_series(variable: Variable, records: &[Record]) -> Built {
    let mut buckets: BTreeMap<DateTime<Utc>, (f64, usize)> = BTreeMap::new();
    let mut kept = 0usize;
    for r in records {
        if let Some(v) = value_of(r, variable) {
            let slot = buckets.entry(r.timestamp()).or_default();
            slot.0 += v;
            slot.1 += 1;
            kept += 1;
        }
    }
    let series = buckets
        .into_iter()
        .map(|(timestamp, (sum, samples))| SeriesPoint {
            timestamp,
            value: sum / samples as f64,
            samples,
        })
        .collect();

    Built {
        dropped: records.len() - kept,
        payload: VizPayload::TimeSeries {
            variable: variable.as_str().into(),
            series,
        },
    }
}

fn depth_profile(variable: Variable, records: &[Record]) -> Built {
    let mut profile: Vec<ProfilePoint> = records
        .iter()
        .filter_map(|r| {
            Some(ProfilePoint {
                depth: r.depth(),
                value: value_of(r, variable)?,
            })
        })
        .collect();
    profile.sort_by(|a, b| a.depth.total_cmp(&b.depth));

    Built {
        dropped: records.len() - profile.len(),
        payload: VizPayload::DepthProfile {
            variable: variable.as_str().into(),
            profile,
        },
    }
}

fn comparison(variable: Variable, records: &[Record]) -> Built {
    let mut by_float: HashMap<&str, Vec<f64>> = HashMap::new();
    let mut kept = 0usize;
    for r in records {
        if let Some(v) = value_of(r, variable) {
            by_float.entry(r.float_id()).or_default().push(v);
            kept += 1;
        }
    }

    let mut groups: Vec<ComparisonGroup> = by_float
        .into_iter()
        .map(|(label, values)| {
            let count = values.len();
            ComparisonGroup {
                label: label.to_string(),
                mean: values.iter().sum::<f64>() / count as f64,
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                count,
            }
        })
        .collect();
    groups.sort_by(|a, b| a.label.cmp(&b.label));

    Built {
        dropped: records.len() - kept,
        payload: VizPayload::Comparison {
            variable: variable.as_str().into(),
            groups,
        },
    }
}

/// Every record becomes a row; a missing value is an empty cell.
pub fn table(variable: Variable, records: &[Record]) -> Built {
    let mut columns: Vec<String> = TABLE_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.push(variable.as_str().into());
    columns.push("qc_flag".into());
    columns.push("source".into());

    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.float_id().to_string(),
                format!("{:.4}", r.latitude()),
                format!("{:.4}", r.longitude()),
                r.timestamp().to_rfc3339(),
                format!("{:.1}", r.depth()),
                value_of(r, variable)
                    .map(|v| format!("{v:.3}"))
                    .unwrap_or_default(),
                r.qc_flag().as_str().into(),
                r.source().as_str().into(),
            ]
        })
        .collect();

    Built {
        payload: VizPayload::Table { columns, rows },
        dropped: 0,
    }
}
