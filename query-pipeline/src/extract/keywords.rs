//! Deterministic keyword extraction, used when the model is unreachable.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use ocean_model::{BoundingBox, DepthRange, Intent, NamedSea, Query, Region, UserRole, Variable};
use regex::Regex;

use super::relative::{relative_window, year_window};

const UNIT: &str = r"(?:meters?|metres?|m)\b";

static DEPTH_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:between|from)?\s*(\d+(?:\.\d+)?)\s*(?:{UNIT})?\s*(?:and|to|-)\s*(\d+(?:\.\d+)?)\s*{UNIT}"
    ))
    .expect("valid regex")
});
static DEPTH_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(\d+(?:\.\d+)?)\s*{UNIT}")).expect("valid regex")
});
static SURFACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsurface\b").expect("valid regex"));
static LAT_LON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*°?\s*([NS])[\s,]+(\d+(?:\.\d+)?)\s*°?\s*([EW])\b")
        .expect("valid regex")
});

const EXPORT_CUES: [&str; 4] = ["export", "download", "csv", "spreadsheet"];
const COMPARE_CUES: [&str; 5] = ["compare", "comparison", " vs ", "versus", "difference between"];
const TREND_CUES: [&str; 8] = [
    "trend",
    "over time",
    "time series",
    "timeseries",
    "changing",
    "changed",
    "increase",
    "decrease",
];

/// Query built from surface cues in `text`.
pub fn keyword_query(text: &str, role: UserRole, now: DateTime<Utc>) -> Query {
    let mut q = Query::new(text, role);
    q.region = coordinates(text)
        .map(Region::BoundingBox)
        .or_else(|| NamedSea::find_in_text(text).map(Region::Named));
    q.variable = Variable::find_in_text(text);
    q.depth_range = depth(text);
    q.intent = intent(text);
    q.time_range = relative_window(text, now).or_else(|| year_window(text));
    q
}

fn coordinates(text: &str) -> Option<BoundingBox> {
    let c = LAT_LON.captures(text)?;
    let mut lat: f64 = c.get(1)?.as_str().parse().ok()?;
    let mut lon: f64 = c.get(3)?.as_str().parse().ok()?;
    if c.get(2)?.as_str().eq_ignore_ascii_case("s") {
        lat = -lat;
    }
    if c.get(4)?.as_str().eq_ignore_ascii_case("w") {
        lon = -lon;
    }
    BoundingBox::point(lat, lon).ok()
}

fn depth(text: &str) -> Option<DepthRange> {
    if let Some(c) = DEPTH_SPAN.captures(text) {
        let a: f64 = c.get(1)?.as_str().parse().ok()?;
        let b: f64 = c.get(2)?.as_str().parse().ok()?;
        return DepthRange::new(a.min(b), a.max(b)).ok();
    }
    if let Some(c) = DEPTH_POINT.captures(text) {
        return DepthRange::at(c.get(1)?.as_str().parse().ok()?).ok();
    }
    SURFACE.is_match(text).then(|| DepthRange::at(0.0).ok()).flatten()
}

fn intent(text: &str) -> Intent {
    let t = format!(" {} ", text.to_lowercase());
    let any = |cues: &[&str]| cues.iter().any(|c| t.contains(c));
    if any(&EXPORT_CUES) {
        Intent::Export
    } else if any(&COMPARE_CUES) {
        Intent::Compare
    } else if any(&TREND_CUES) {
        Intent::Trend
    } else {
        Intent::Lookup
    }
}
