//! Property tests for the local providers.
//!
//! 1. Every synthetic and mock observation satisfies the coordinate/depth invariants
//! 2. Generated values stay inside physically plausible bounds
//! 3. Synthetic output is a pure function of the query

use chrono::{TimeZone, Utc};
use float_sources::{MockProvider, SyntheticProvider, synthetic::curves::plausible_range};
use ocean_model::{
    BoundingBox, DepthRange, Intent, NamedSea, Query, Region, TimeRange, UserRole, Variable,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn variable_strategy() -> impl Strategy<Value = Variable> {
    prop::sample::select(Variable::ALL.to_vec())
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::Lookup),
        Just(Intent::Trend),
        Just(Intent::Compare),
        Just(Intent::Export),
    ]
}

fn region_strategy() -> impl Strategy<Value = Region> {
    prop_oneof![
        prop::sample::select(NamedSea::ALL.to_vec()).prop_map(Region::Named),
        (-180.0f64..170.0, -90.0f64..80.0, 0.0f64..10.0, 0.0f64..10.0).prop_map(
            |(lon, lat, w, h)| {
                let bbox = BoundingBox::new(lon, lat, lon + w, lat + h).unwrap();
                Region::BoundingBox(bbox)
            }
        ),
        (-90.0f64..=90.0, -180.0f64..=180.0)
            .prop_map(|(lat, lon)| Region::BoundingBox(BoundingBox::point(lat, lon).unwrap())),
    ]
}

fn depth_strategy() -> impl Strategy<Value = Option<DepthRange>> {
    prop_oneof![
        Just(None),
        (0.0f64..=11_000.0).prop_map(|d| Some(DepthRange::at(d).unwrap())),
        (0.0f64..=6_000.0, 0.0f64..=5_000.0)
            .prop_map(|(a, span)| Some(DepthRange::new(a, a + span).unwrap())),
    ]
}

fn time_strategy() -> impl Strategy<Value = Option<TimeRange>> {
    prop_oneof![
        Just(None),
        (0i64..3_650, 0i64..1_000).prop_map(|(back, len)| {
            let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() - chrono::Duration::days(back);
            Some(TimeRange::new(end - chrono::Duration::days(len), end).unwrap())
        }),
    ]
}

fn query_strategy() -> impl Strategy<Value = Query> {
    (
        prop::option::of(region_strategy()),
        prop::option::of(variable_strategy()),
        depth_strategy(),
        time_strategy(),
        intent_strategy(),
    )
        .prop_map(|(region, variable, depth_range, time_range, intent)| Query {
            raw_text: "generated".into(),
            region,
            variable,
            depth_range,
            time_range,
            user_role: UserRole::Researcher,
            intent,
        })
}

fn anchor() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn synthetic_observations_are_valid(q in query_strategy()) {
        let obs = SyntheticProvider::new(anchor()).generate(&q);
        prop_assert!(!obs.is_empty());

        let bbox = q.region.map(|r| r.bbox());
        let (lo, hi) = plausible_range(q.variable_or_default());
        for o in &obs {
            prop_assert!((-90.0..=90.0).contains(&o.latitude()));
            prop_assert!((-180.0..=180.0).contains(&o.longitude()));
            prop_assert!((0.0..=11_000.0).contains(&o.depth()));
            if let Some(b) = bbox {
                prop_assert!(b.contains(o.latitude(), o.longitude()));
            }
            if let Some(d) = q.depth_range {
                prop_assert!(d.contains(o.depth()));
            }
            let v = o.value(q.variable_or_default()).unwrap();
            prop_assert!(v >= lo && v <= hi);
        }
    }

    #[test]
    fn synthetic_is_deterministic(q in query_strategy()) {
        let p = SyntheticProvider::new(anchor());
        prop_assert_eq!(p.generate(&q), p.generate(&q));
    }

    #[test]
    fn mock_observations_are_valid(q in query_strategy()) {
        let obs = MockProvider::new().fixtures(&q);
        prop_assert!(!obs.is_empty());
        for o in &obs {
            prop_assert!((-90.0..=90.0).contains(&o.latitude()));
            prop_assert!((-180.0..=180.0).contains(&o.longitude()));
            prop_assert!((0.0..=11_000.0).contains(&o.depth()));
        }
    }
}
