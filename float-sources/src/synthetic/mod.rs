//! Deterministic synthetic float data.
//!
//! Values follow [`curves::baseline`] plus a small hash-seeded perturbation,
//! so an identical query against the same provider always yields identical
//! observations. The sampling layout depends on what the question asks for:
//!
//! | Query                                | Layout                                    |
//! |--------------------------------------|-------------------------------------------|
//! | trend                                | one site, monthly timestamps              |
//! | explicit depth span (not a point)    | one site, standard depth levels           |
//! | anything else                        | scattered floats at one depth and window  |
//! | point location                       | always a single site                      |

pub mod curves;
pub mod noise;

use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use futures::future::BoxFuture;
use ocean_model::{DataSource, Intent, NamedSea, Observation, QcFlag, Query, Variable};
use tracing::debug;

use crate::{
    error::ProviderFailure,
    provider::{DataProvider, ResolvedQuery},
};
use curves::{Site, baseline, noise_amplitude, plausible_range};
use noise::SampleKey;

/// Floats scattered over the region for snapshot queries.
pub const SNAPSHOT_FLOATS: u32 = 12;
/// Upper bound on monthly samples in a trend series.
pub const MAX_SERIES_POINTS: u32 = 24;
/// Levels sampled for depth profiles (m), filtered to the requested span.
pub const STANDARD_LEVELS_M: [f64; 27] = [
    0.0, 5.0, 10.0, 20.0, 30.0, 50.0, 75.0, 100.0, 125.0, 150.0, 200.0, 250.0, 300.0, 400.0,
    500.0, 600.0, 700.0, 800.0, 900.0, 1000.0, 1100.0, 1200.0, 1300.0, 1400.0, 1500.0, 1750.0,
    2000.0,
];
/// Long-term warming applied to synthetic temperatures (°C per year since 2000).
const WARMING_C_PER_YEAR: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Snapshot,
    Profile,
    Series,
}

fn layout(r: &ResolvedQuery) -> Layout {
    match r.intent {
        Intent::Trend => Layout::Series,
        _ if r.explicit_depth && !r.depth.is_point() => Layout::Profile,
        _ => Layout::Snapshot,
    }
}

/// Synthetic provider anchored to a fixed "now".
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    anchor: DateTime<Utc>,
    timeout: Duration,
}

impl SyntheticProvider {
    /// `anchor` resolves relative defaults (e.g. "last 30 days") and never moves.
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            timeout: Duration::from_secs(1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generates observations for `query`. Pure and synchronous.
    pub fn generate(&self, query: &Query) -> Vec<Observation> {
        let r = ResolvedQuery::resolve(query, self.anchor);
        let layout = layout(&r);
        let sites = self.sites(&r, layout);
        let depths = depth_levels(&r, layout);
        let times = timestamps(&r, layout);

        let mut out = Vec::with_capacity(sites.len() * depths.len() * times.len().max(1));
        for (idx, (id, lat, lon)) in sites.iter().enumerate() {
            let (lat, lon) = (*lat, *lon);
            // Snapshot floats each surface at their own moment in the window.
            let own_time;
            let site_times: &[DateTime<Utc>] = if layout == Layout::Snapshot {
                own_time = [snapshot_time(&r, lat, lon, idx as u32)];
                &own_time
            } else {
                &times
            };
            for &ts in site_times {
                for &depth in &depths {
                    if let Some(obs) = sample(r.variable, id, lat, lon, depth, ts) {
                        out.push(obs);
                    }
                }
            }
        }
        debug!(
            variable = r.variable.as_str(),
            layout = ?layout,
            count = out.len(),
            "synthetic observations generated"
        );
        out
    }

    fn sites(&self, r: &ResolvedQuery, layout: Layout) -> Vec<(String, f64, f64)> {
        let (clat, clon) = r.bbox.center();
        if r.bbox.is_point() || layout != Layout::Snapshot {
            return vec![(float_id(clat, clon, 0), clat, clon)];
        }
        (0..SNAPSHOT_FLOATS)
            .map(|i| {
                let fy = key("site-lat", clat, clon, 0.0, i).unit();
                let fx = key("site-lon", clat, clon, 0.0, i).unit();
                let (lat, lon) = r.bbox.interpolate(fy, fx);
                (float_id(clat, clon, i), lat, lon)
            })
            .collect()
    }
}

impl DataProvider for SyntheticProvider {
    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn fetch<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>> {
        Box::pin(async move { Ok(self.generate(query)) })
    }
}

fn key(tag: &str, latitude: f64, longitude: f64, depth: f64, index: u32) -> SampleKey<'_> {
    SampleKey {
        tag,
        latitude,
        longitude,
        depth,
        day: 0,
        index,
    }
}

/// WMO-style seven digit identifier.
fn float_id(lat: f64, lon: f64, index: u32) -> String {
    format!("29{:05}", key("float", lat, lon, 0.0, index).below(100_000))
}

fn depth_levels(r: &ResolvedQuery, layout: Layout) -> Vec<f64> {
    if layout != Layout::Profile {
        return vec![r.depth.min()];
    }
    let mut levels: Vec<f64> = STANDARD_LEVELS_M
        .iter()
        .copied()
        .filter(|d| r.depth.contains(*d))
        .collect();
    for end in [r.depth.min(), r.depth.max()] {
        if !levels.contains(&end) {
            levels.push(end);
        }
    }
    levels.sort_by(f64::total_cmp);
    levels
}

fn timestamps(r: &ResolvedQuery, layout: Layout) -> Vec<DateTime<Utc>> {
    let (start, end) = (r.time.start(), r.time.end());
    match layout {
        Layout::Series => {
            let months = ((end - start).num_days() / 30).clamp(1, MAX_SERIES_POINTS as i64 - 1);
            let n = months + 1;
            (0..n).map(|i| at_fraction(start, end, i as f64 / months as f64)).collect()
        }
        Layout::Profile => vec![whole_seconds(end)],
        Layout::Snapshot => Vec::new(),
    }
}

fn snapshot_time(r: &ResolvedQuery, lat: f64, lon: f64, index: u32) -> DateTime<Utc> {
    let f = key("time", lat, lon, 0.0, index).unit();
    at_fraction(r.time.start(), r.time.end(), f)
}

fn at_fraction(start: DateTime<Utc>, end: DateTime<Utc>, f: f64) -> DateTime<Utc> {
    let span = (end - start).num_seconds() as f64;
    let secs = start.timestamp() + (span * f.clamp(0.0, 1.0)) as i64;
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(start)
}

fn whole_seconds(t: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(t.timestamp(), 0).unwrap_or(t)
}

/// Most specific named sea containing the point; [`NamedSea::ALL`] lists regional seas first.
fn sea_at(lat: f64, lon: f64) -> Option<NamedSea> {
    NamedSea::ALL.into_iter().find(|s| s.bbox().contains(lat, lon))
}

fn sample(
    variable: Variable,
    float_id: &str,
    lat: f64,
    lon: f64,
    depth: f64,
    ts: DateTime<Utc>,
) -> Option<Observation> {
    let site = Site {
        latitude: lat,
        depth,
        day_of_year: ts.ordinal(),
        sea: sea_at(lat, lon),
    };
    let day = ts.timestamp().div_euclid(86_400);
    let noise = SampleKey {
        tag: variable.as_str(),
        latitude: lat,
        longitude: lon,
        depth,
        day,
        index: 0,
    };

    let mut value = baseline(variable, site) + noise_amplitude(variable) * noise.signed();
    if variable == Variable::Temperature {
        value += WARMING_C_PER_YEAR * (ts.year() - 2000) as f64;
    }
    let (lo, hi) = plausible_range(variable);
    let value = value.clamp(lo, hi);

    let qc_key = SampleKey { tag: "qc", ..noise };
    let qc = match qc_key.unit() {
        u if u < 0.90 => QcFlag::Good,
        u if u < 0.98 => QcFlag::ProbablyGood,
        _ => QcFlag::Bad,
    };

    // Invalid coordinates cannot occur here (sites are interpolated inside a
    // validated box); `ok()` keeps the boundary check in one place.
    Observation::new(float_id, lat, lon, whole_seconds(ts), depth, qc)
        .ok()
        .map(|o| o.with_value(variable, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ocean_model::{DepthRange, Region, UserRole};
    use std::collections::HashSet;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 12, 0, 0).unwrap()
    }

    fn query(variable: Variable, sea: NamedSea) -> Query {
        let mut q = Query::new("q", UserRole::Student);
        q.variable = Some(variable);
        q.region = Some(Region::Named(sea));
        q
    }

    #[test]
    fn identical_queries_identical_output() {
        let p = SyntheticProvider::new(anchor());
        let q = query(Variable::Salinity, NamedSea::ArabianSea);
        assert_eq!(p.generate(&q), p.generate(&q));
    }

    #[test]
    fn snapshot_scatters_floats_inside_region() {
        let p = SyntheticProvider::new(anchor());
        let q = query(Variable::Temperature, NamedSea::BayOfBengal);
        let obs = p.generate(&q);
        assert_eq!(obs.len(), SNAPSHOT_FLOATS as usize);
        let bbox = NamedSea::BayOfBengal.bbox();
        assert!(obs.iter().all(|o| bbox.contains(o.latitude(), o.longitude())));
        let distinct: HashSet<_> = obs
            .iter()
            .map(|o| (o.latitude().to_bits(), o.longitude().to_bits()))
            .collect();
        assert!(distinct.len() >= 2);
    }

    #[test]
    fn bay_of_bengal_500m_is_thermocline_water() {
        let p = SyntheticProvider::new(anchor());
        let mut q = query(Variable::Temperature, NamedSea::BayOfBengal);
        q.depth_range = Some(DepthRange::at(500.0).unwrap());
        for o in p.generate(&q) {
            let t = o.value(Variable::Temperature).unwrap();
            assert!((2.0..=15.0).contains(&t), "t = {t}");
            assert_eq!(o.depth(), 500.0);
        }
    }

    #[test]
    fn depth_span_yields_single_site_profile() {
        let p = SyntheticProvider::new(anchor());
        let mut q = query(Variable::Oxygen, NamedSea::ArabianSea);
        q.depth_range = Some(DepthRange::new(0.0, 1000.0).unwrap());
        let obs = p.generate(&q);
        assert!(obs.len() > 5);
        let first = &obs[0];
        assert!(obs.iter().all(|o| o.latitude() == first.latitude()
            && o.longitude() == first.longitude()
            && o.timestamp() == first.timestamp()));
        assert!(obs.windows(2).all(|w| w[0].depth() < w[1].depth()));
        assert_eq!(obs.last().unwrap().depth(), 1000.0);
    }

    #[test]
    fn trend_yields_monthly_series() {
        let p = SyntheticProvider::new(anchor());
        let mut q = query(Variable::Temperature, NamedSea::ArabianSea);
        q.intent = Intent::Trend;
        let obs = p.generate(&q);
        assert_eq!(obs.len(), MAX_SERIES_POINTS as usize);
        assert!(obs.windows(2).all(|w| w[0].timestamp() < w[1].timestamp()));
        assert!(obs.iter().all(|o| o.float_id() == obs[0].float_id()));
    }
}
