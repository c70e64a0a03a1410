//! Field-by-field validation of the model's JSON answer.
//!
//! The model output is parsed into an untyped [`Value`] and each field is
//! checked on its own; an invalid field falls back to its default without
//! affecting the others.

use chrono::{DateTime, Utc};
use ocean_model::{BoundingBox, DepthRange, Intent, NamedSea, Query, Region, TimeRange, UserRole, Variable};
use serde_json::{Map, Value};
use tracing::debug;

use super::relative::{parse_date, relative_window};

/// Builds a [`Query`] from raw model output.
///
/// Returns `None` when no JSON object can be found at all.
pub fn query_from_output(
    raw_output: &str,
    question: &str,
    role: UserRole,
    now: DateTime<Utc>,
) -> Option<Query> {
    let obj = find_json_object(raw_output)?;

    let mut q = Query::new(question, role);
    q.region = region(&obj);
    q.variable = variable(obj.get("variable"));
    q.depth_range = depth(obj.get("depth_min"), obj.get("depth_max"));
    q.time_range = time(obj.get("time_start"), obj.get("time_end"), now);
    q.intent = obj
        .get("intent")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or(Intent::Lookup);

    debug!(
        region = %q.region.map(|r| r.label()).unwrap_or_default(),
        variable = q.variable.map(|v| v.as_str()).unwrap_or("-"),
        has_depth = q.depth_range.is_some(),
        has_time = q.time_range.is_some(),
        intent = q.intent.as_str(),
        "extracted parameters"
    );
    Some(q)
}

/// Trim common code-fence wrappers around JSON.
pub fn cleanup_json_like(s: &str) -> String {
    let mut t = s.trim().to_string();
    if t.starts_with("```") {
        t = t
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .to_string();
        if let Some(pos) = t.rfind("```") {
            t.truncate(pos);
        }
    }
    t.trim().to_string()
}

/// First JSON object in `s`: the whole cleaned text, else the outermost `{…}` span.
pub fn find_json_object(s: &str) -> Option<Map<String, Value>> {
    let clean = cleanup_json_like(s);
    if let Ok(Value::Object(m)) = serde_json::from_str::<Value>(&clean) {
        return Some(m);
    }
    let start = clean.find('{')?;
    let end = clean.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&clean[start..=end]) {
        Ok(Value::Object(m)) => Some(m),
        _ => None,
    }
}

/// Explicit `bbox` beats `region_name`.
fn region(obj: &Map<String, Value>) -> Option<Region> {
    let explicit = obj.get("bbox").and_then(|v| {
        let arr = v.as_array()?;
        if arr.len() != 4 {
            return None;
        }
        let n: Vec<f64> = arr.iter().filter_map(number).collect();
        if n.len() != 4 {
            return None;
        }
        BoundingBox::new(n[0], n[1], n[2], n[3]).ok()
    });
    if let Some(b) = explicit {
        return Some(Region::BoundingBox(b));
    }

    let name = obj.get("region_name")?.as_str()?;
    NamedSea::from_name(name)
        .or_else(|| NamedSea::find_in_text(name))
        .map(Region::Named)
}

/// A name, or the first valid name of an array.
fn variable(v: Option<&Value>) -> Option<Variable> {
    match v? {
        Value::String(s) => Variable::from_name(s),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find_map(Variable::from_name),
        _ => None,
    }
}

/// One bound alone collapses to a point range.
fn depth(min: Option<&Value>, max: Option<&Value>) -> Option<DepthRange> {
    match (min.and_then(number), max.and_then(number)) {
        (Some(a), Some(b)) => DepthRange::new(a.min(b), a.max(b)).ok(),
        (Some(v), None) | (None, Some(v)) => DepthRange::at(v).ok(),
        (None, None) => None,
    }
}

fn time(start: Option<&Value>, end: Option<&Value>, now: DateTime<Utc>) -> Option<TimeRange> {
    let start = start.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty());
    let end = end.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty());

    if let Some(window) = start.and_then(|s| relative_window(s, now)) {
        return Some(window);
    }
    let start = start.and_then(|s| parse_date(s, false));
    let end = end.and_then(|s| parse_date(s, true));
    match (start, end) {
        (Some(s), Some(e)) => TimeRange::new(s, e).ok(),
        (Some(s), None) => TimeRange::new(s, now).ok(),
        _ => None,
    }
}

fn number(v: &Value) -> Option<f64> {
    let x: Option<f64> = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('m').trim().parse().ok(),
        _ => None,
    };
    x.filter(|x| x.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap()
    }

    fn parse(raw: &str) -> Query {
        query_from_output(raw, "q", UserRole::Student, now()).unwrap()
    }

    #[test]
    fn full_answer() {
        let q = parse(
            r#"{"region_name":"Bay of Bengal","bbox":null,"variable":"temperature",
                "depth_min":500,"depth_max":null,"time_start":null,"time_end":null,"intent":"lookup"}"#,
        );
        assert_eq!(q.region, Some(Region::Named(NamedSea::BayOfBengal)));
        assert_eq!(q.variable, Some(Variable::Temperature));
        let d = q.depth_range.unwrap();
        assert_eq!((d.min(), d.max()), (500.0, 500.0));
        assert_eq!(q.intent, Intent::Lookup);
        assert!(q.time_range.is_none());
    }

    #[test]
    fn bbox_beats_region_name() {
        let q = parse(r#"{"region_name":"Arabian Sea","bbox":[85,10,90,15]}"#);
        match q.region {
            Some(Region::BoundingBox(b)) => assert_eq!(b.min_lon(), 85.0),
            other => panic!("expected bbox, got {other:?}"),
        }
    }

    #[test]
    fn invalid_fields_fall_back_individually() {
        let q = parse(
            r#"```json
            {"region_name":"Atlantis","bbox":[200,0,10,10],"variable":"plankton count",
             "depth_min":-5,"depth_max":"deep","time_start":"2024-13-40","intent":"dance",
             "variable_extra": 1}
            ```"#,
        );
        assert!(q.region.is_none());
        assert!(q.variable.is_none());
        assert!(q.depth_range.is_none());
        assert!(q.time_range.is_none());
        assert_eq!(q.intent, Intent::Lookup);
    }

    #[test]
    fn relative_time_and_trend() {
        let q = parse(r#"{"variable":["sal","temp"],"time_start":"last 3 years","intent":"trend"}"#);
        assert_eq!(q.variable, Some(Variable::Salinity));
        let t = q.time_range.unwrap();
        assert_eq!(t.end(), now());
        assert_eq!(t.start(), Utc.with_ymd_and_hms(2022, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(q.intent, Intent::Trend);
    }

    #[test]
    fn object_embedded_in_prose() {
        let q = parse("Sure! Here you go: {\"variable\": \"oxygen\"} Hope that helps.");
        assert_eq!(q.variable, Some(Variable::Oxygen));
    }

    #[test]
    fn no_object_is_none() {
        assert!(query_from_output("I cannot help with that.", "q", UserRole::Student, now()).is_none());
        assert!(query_from_output("[1, 2, 3]", "q", UserRole::Student, now()).is_none());
    }
}
