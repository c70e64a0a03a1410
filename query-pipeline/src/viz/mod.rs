//! Visualization selection: picks a view from the records' shape and the intent.

mod payload;

use std::collections::HashSet;

use ocean_model::{Intent, Query, Record, VisualizationSpec, VizKind};
use tracing::{debug, warn};

use crate::error::VisualizationBuildFailure;

pub use payload::{Built, TABLE_COLUMNS, build};

/// Chosen visualization plus degradation notes.
#[derive(Debug, Clone)]
pub struct Selection {
    pub spec: VisualizationSpec,
    pub warnings: Vec<String>,
}

pub struct VisualizationSelector {
    drop_warn_ratio: f64,
}

impl Default for VisualizationSelector {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl VisualizationSelector {
    pub fn new(drop_warn_ratio: f64) -> Self {
        Self { drop_warn_ratio }
    }

    /// Decision table; the first matching rule wins.
    ///
    /// | rule | kind |
    /// |---|---|
    /// | fewer than 2 records | table |
    /// | ≥2 distinct positions, intent not trend | map |
    /// | intent trend, or >1 timestamp at one position | time_series |
    /// | >1 depth at one position and time | depth_profile |
    /// | intent compare | comparison |
    /// | otherwise | table |
    pub fn choose_kind(query: &Query, records: &[Record]) -> VizKind {
        if records.len() < 2 {
            return VizKind::Table;
        }
        let positions = distinct(records, |r| (key(r.latitude()), key(r.longitude())));
        let times = distinct(records, |r| r.timestamp());
        let depths = distinct(records, |r| key(r.depth()));

        if positions >= 2 && query.intent != Intent::Trend {
            VizKind::Map
        } else if query.intent == Intent::Trend || (positions == 1 && times > 1) {
            VizKind::TimeSeries
        } else if positions == 1 && depths > 1 {
            VizKind::DepthProfile
        } else if query.intent == Intent::Compare {
            VizKind::Comparison
        } else {
            VizKind::Table
        }
    }

    /// Strict build of `kind`.
    ///
    /// # Errors
    /// [`VisualizationBuildFailure`] when no record survives for a non-table view.
    pub fn try_build(
        &self,
        kind: VizKind,
        query: &Query,
        records: &[Record],
    ) -> Result<Built, VisualizationBuildFailure> {
        let built = build(kind, query.variable_or_default(), records);
        if kind != VizKind::Table && built.payload.is_empty() {
            return Err(VisualizationBuildFailure::EmptyPayload {
                kind,
                dropped: built.dropped,
            });
        }
        Ok(built)
    }

    /// Never fails: an empty payload degrades to the raw-record table.
    pub fn select(&self, query: &Query, records: &[Record]) -> Selection {
        let kind = Self::choose_kind(query, records);
        let variable = query.variable_or_default();
        let mut warnings = Vec::new();

        let built = match self.try_build(kind, query, records) {
            Ok(b) => b,
            Err(err) => {
                warn!(error = %err, "visualization degraded to table");
                warnings.push(format!("Showing a table instead: {err}."));
                payload::table(variable, records)
            }
        };

        if !records.is_empty() {
            let ratio = built.dropped as f64 / records.len() as f64;
            if ratio > self.drop_warn_ratio {
                warnings.push(format!(
                    "{} of {} records had no {variable} value and were left out of the chart.",
                    built.dropped,
                    records.len()
                ));
            }
        }

        let spec = VisualizationSpec::new(title(query, built.payload.kind()), built.payload);
        debug!(kind = spec.kind().as_str(), items = spec.payload().len(), "visualization selected");
        Selection { spec, warnings }
    }
}

fn title(query: &Query, kind: VizKind) -> String {
    let variable = query.variable_or_default();
    let place = query
        .region
        .map(|r| format!(" in {}", r.label()))
        .unwrap_or_default();
    let view = match kind {
        VizKind::Map => "",
        VizKind::TimeSeries => " over time",
        VizKind::DepthProfile => " by depth",
        VizKind::Comparison => " by float",
        VizKind::Table => " records",
    };
    let mut name = variable.as_str().to_string();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    format!("{name}{view}{place}")
}

/// Positions and depths compare at 1e-4 resolution.
fn key(x: f64) -> i64 {
    (x * 1e4).round() as i64
}

fn distinct<T: Eq + std::hash::Hash>(records: &[Record], f: impl Fn(&Record) -> T) -> usize {
    records.iter().map(f).collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use ocean_model::{DataSource, NamedSea, Observation, QcFlag, Region, UserRole, Variable};

    fn rec(lat: f64, lon: f64, day: i64, depth: f64, v: Option<f64>) -> Record {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        let mut o = Observation::new("2902746", lat, lon, t, depth, QcFlag::Good).unwrap();
        if let Some(v) = v {
            o = o.with_value(Variable::Temperature, v);
        }
        o.stamp(DataSource::Synthetic, t)
    }

    fn query(intent: Intent) -> Query {
        let mut q = Query::new("q", UserRole::Student);
        q.region = Some(Region::Named(NamedSea::BayOfBengal));
        q.variable = Some(Variable::Temperature);
        q.intent = intent;
        q
    }

    #[test]
    fn five_positions_lookup_is_map() {
        let records: Vec<_> = (0..5).map(|i| rec(10.0 + i as f64, 85.0, 0, 10.0, Some(28.0))).collect();
        assert_eq!(VisualizationSelector::choose_kind(&query(Intent::Lookup), &records), VizKind::Map);
    }

    #[test]
    fn one_position_many_times_is_series() {
        let records: Vec<_> = (0..5).map(|d| rec(15.0, 88.0, d, 10.0, Some(28.0))).collect();
        assert_eq!(
            VisualizationSelector::choose_kind(&query(Intent::Lookup), &records),
            VizKind::TimeSeries
        );
    }

    #[test]
    fn trend_beats_map() {
        let records: Vec<_> = (0..5).map(|i| rec(10.0 + i as f64, 85.0, i, 10.0, Some(28.0))).collect();
        assert_eq!(
            VisualizationSelector::choose_kind(&query(Intent::Trend), &records),
            VizKind::TimeSeries
        );
    }

    #[test]
    fn one_cast_is_profile() {
        let records: Vec<_> = [0.0, 100.0, 500.0]
            .into_iter()
            .map(|d| rec(15.0, 88.0, 0, d, Some(20.0)))
            .collect();
        assert_eq!(
            VisualizationSelector::choose_kind(&query(Intent::Compare), &records),
            VizKind::DepthProfile
        );
    }

    #[test]
    fn colocated_compare_is_comparison() {
        let records = vec![rec(15.0, 88.0, 0, 10.0, Some(20.0)), rec(15.0, 88.0, 0, 10.0, Some(21.0))];
        assert_eq!(
            VisualizationSelector::choose_kind(&query(Intent::Compare), &records),
            VizKind::Comparison
        );
        assert_eq!(VisualizationSelector::choose_kind(&query(Intent::Lookup), &records), VizKind::Table);
    }

    #[test]
    fn single_record_is_table() {
        let sel = VisualizationSelector::default().select(&query(Intent::Trend), &[rec(15.0, 88.0, 0, 10.0, Some(1.0))]);
        assert_eq!(sel.spec.kind(), VizKind::Table);
        assert!(sel.warnings.is_empty());
    }

    #[test]
    fn no_values_degrades_to_table() {
        let records: Vec<_> = (0..4).map(|i| rec(10.0 + i as f64, 85.0, 0, 10.0, None)).collect();
        let sel = VisualizationSelector::default().select(&query(Intent::Lookup), &records);
        assert_eq!(sel.spec.kind(), VizKind::Table);
        assert_eq!(sel.spec.payload().len(), 4);
        assert_eq!(sel.warnings.len(), 1);
        assert!(sel.warnings[0].contains("map view"));
    }

    #[test]
    fn heavy_drop_rate_warns() {
        let mut records: Vec<_> = (0..3).map(|i| rec(10.0 + i as f64, 85.0, 0, 10.0, None)).collect();
        records.push(rec(20.0, 85.0, 0, 10.0, Some(27.0)));
        let sel = VisualizationSelector::default().select(&query(Intent::Lookup), &records);
        assert_eq!(sel.spec.kind(), VizKind::Map);
        assert_eq!(sel.spec.title(), "Temperature in Bay of Bengal");
        assert!(sel.warnings[0].starts_with("3 of 4 records"));
    }
}
