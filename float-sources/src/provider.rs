//! The polymorphic provider capability and the query resolution all providers share.

use std::time::Duration;

use chrono::{DateTime, Duration as Span, Utc};
use futures::future::BoxFuture;
use ocean_model::{
    BoundingBox, DataSource, DepthRange, Intent, NamedSea, Observation, Query, TimeRange, Variable,
};

use crate::error::ProviderFailure;

/// Northern Indian Ocean, used when the question names no region.
pub const DEFAULT_BBOX: [f64; 4] = [68.0, 6.0, 97.0, 37.0];
/// Depth used when the question names none (near-surface).
pub const DEFAULT_DEPTH_M: f64 = 10.0;
/// Look-back for lookups without a time range.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
/// Look-back for trends without a time range.
pub const DEFAULT_TREND_YEARS: i64 = 5;

/// A source of float observations.
pub trait DataProvider: Send + Sync {
    fn source(&self) -> DataSource;

    /// Budget for one `fetch`, enforced by the chain.
    fn timeout(&self) -> Duration;

    fn fetch<'a>(&'a self, query: &'a Query) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>>;
}

/// Query with every optional field resolved to a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub bbox: BoundingBox,
    pub variable: Variable,
    pub depth: DepthRange,
    pub time: TimeRange,
    pub intent: Intent,
    /// True when the depth came from the question.
    pub explicit_depth: bool,
}

impl ResolvedQuery {
    /// Fills defaults relative to `now`.
    pub fn resolve(query: &Query, now: DateTime<Utc>) -> Self {
        let bbox = match query.region {
            Some(r) => r.bbox(),
            None => default_bbox(),
        };
        let depth = query
            .depth_range
            .unwrap_or_else(|| DepthRange::clamped(DEFAULT_DEPTH_M, DEFAULT_DEPTH_M));
        let time = query.time_range.unwrap_or_else(|| {
            let back = match query.intent {
                Intent::Trend => Span::days(365 * DEFAULT_TREND_YEARS),
                _ => Span::days(DEFAULT_LOOKBACK_DAYS),
            };
            TimeRange::ordered(now - back, now)
        });
        Self {
            bbox,
            variable: query.variable_or_default(),
            depth,
            time,
            intent: query.intent,
            explicit_depth: query.depth_range.is_some(),
        }
    }
}

fn default_bbox() -> BoundingBox {
    let [min_lon, min_lat, max_lon, max_lat] = DEFAULT_BBOX;
    BoundingBox::new(min_lon, min_lat, max_lon, max_lat).unwrap_or_else(|_| NamedSea::IndianOcean.bbox())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ocean_model::{Region, UserRole};

    #[test]
    fn defaults_fill_unset_fields() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let q = Query::new("anything", UserRole::Student);
        let r = ResolvedQuery::resolve(&q, now);
        assert_eq!(r.bbox.min_lon(), 68.0);
        assert_eq!(r.variable, Variable::Temperature);
        assert_eq!(r.depth.min(), DEFAULT_DEPTH_M);
        assert!(!r.explicit_depth);
        assert_eq!(r.time.end(), now);
        assert_eq!(r.time.start(), now - Span::days(30));
    }

    #[test]
    fn trend_looks_back_years() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let mut q = Query::new("trend", UserRole::Researcher);
        q.intent = Intent::Trend;
        q.region = Some(Region::Named(NamedSea::ArabianSea));
        let r = ResolvedQuery::resolve(&q, now);
        assert_eq!(r.bbox, NamedSea::ArabianSea.bbox());
        assert!(r.time.end() - r.time.start() >= Span::days(365 * 5));
    }
}
