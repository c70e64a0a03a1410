//! Structured query produced by parameter extraction.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, Result},
    region::Region,
    variable::Variable,
};

/// Deepest point of the ocean, rounded up (meters).
pub const MAX_OCEAN_DEPTH_M: f64 = 11_000.0;

/// Inclusive depth window in meters, `0 <= min <= max <= 11000`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthRange {
    min: f64,
    max: f64,
}

impl DepthRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        let ok = min.is_finite()
            && max.is_finite()
            && min >= 0.0
            && min <= max
            && max <= MAX_OCEAN_DEPTH_M;
        if ok {
            Ok(Self { min, max })
        } else {
            Err(ModelError::InvalidDepthRange { min, max })
        }
    }

    /// Single-depth range `(v, v)`.
    pub fn at(depth: f64) -> Result<Self> {
        Self::new(depth, depth)
    }

    /// Clamps both ends into `[0, 11000]` and orders them. Non-finite ends become `0`.
    pub fn clamped(a: f64, b: f64) -> Self {
        let fix = |v: f64| if v.is_finite() { v.clamp(0.0, MAX_OCEAN_DEPTH_M) } else { 0.0 };
        let (a, b) = (fix(a), fix(b));
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }
    pub fn max(&self) -> f64 {
        self.max
    }
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }
    pub fn contains(&self, depth: f64) -> bool {
        depth >= self.min && depth <= self.max
    }
}

/// Inclusive UTC time window, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start <= end {
            Ok(Self { start, end })
        } else {
            Err(ModelError::InvalidTimeRange)
        }
    }

    /// Window between two instants in either order.
    pub fn ordered(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Audience the answer is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Researcher,
    Policymaker,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Researcher => "researcher",
            UserRole::Policymaker => "policymaker",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "researcher" | "scientist" => Ok(UserRole::Researcher),
            "policymaker" | "policy" | "policy-maker" => Ok(UserRole::Policymaker),
            other => Err(ModelError::UnknownLabel {
                kind: "user role",
                value: other.to_string(),
            }),
        }
    }
}

/// What the user wants to do with the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    #[default]
    Lookup,
    Trend,
    Compare,
    Export,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Lookup => "lookup",
            Intent::Trend => "trend",
            Intent::Compare => "compare",
            Intent::Export => "export",
        }
    }
}

impl FromStr for Intent {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lookup" | "show" | "map" | "profile" => Ok(Intent::Lookup),
            "trend" | "timeseries" | "time_series" => Ok(Intent::Trend),
            "compare" | "comparison" => Ok(Intent::Compare),
            "export" | "download" => Ok(Intent::Export),
            other => Err(ModelError::UnknownLabel {
                kind: "intent",
                value: other.to_string(),
            }),
        }
    }
}

/// Retrieval parameters for one question.
///
/// Built once by the extractor and shared read-only afterwards; optional
/// fields stay `None` when the question did not determine them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub raw_text: String,
    pub region: Option<Region>,
    pub variable: Option<Variable>,
    pub depth_range: Option<DepthRange>,
    pub time_range: Option<TimeRange>,
    pub user_role: UserRole,
    pub intent: Intent,
}

impl Query {
    /// Query with only the text and role set (`intent = lookup`).
    pub fn new(raw_text: impl Into<String>, user_role: UserRole) -> Self {
        Self {
            raw_text: raw_text.into(),
            region: None,
            variable: None,
            depth_range: None,
            time_range: None,
            user_role,
            intent: Intent::default(),
        }
    }

    /// Requested variable, or temperature when the question named none.
    pub fn variable_or_default(&self) -> Variable {
        self.variable.unwrap_or_default()
    }

    /// True when both region and variable were determined.
    pub fn is_concrete(&self) -> bool {
        self.region.is_some() && self.variable.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn depth_range_bounds() {
        assert!(DepthRange::new(0.0, 2000.0).is_ok());
        assert!(DepthRange::new(500.0, 100.0).is_err());
        assert!(DepthRange::new(-1.0, 10.0).is_err());
        assert!(DepthRange::new(0.0, 11_001.0).is_err());

        let c = DepthRange::clamped(12_000.0, -5.0);
        assert_eq!((c.min(), c.max()), (0.0, MAX_OCEAN_DEPTH_M));
        assert!(DepthRange::at(500.0).unwrap().is_point());
    }

    #[test]
    fn time_range_ordering() {
        let a = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        assert!(TimeRange::new(a, b).is_ok());
        assert_eq!(TimeRange::new(b, a), Err(ModelError::InvalidTimeRange));
    }

    #[test]
    fn role_and_intent_parsing() {
        assert_eq!("Researcher".parse::<UserRole>().ok(), Some(UserRole::Researcher));
        assert!("admiral".parse::<UserRole>().is_err());
        assert_eq!("comparison".parse::<Intent>().ok(), Some(Intent::Compare));
    }

    #[test]
    fn default_query_is_lookup_with_unset_fields() {
        let q = Query::new("hello", UserRole::Student);
        assert_eq!(q.intent, Intent::Lookup);
        assert!(!q.is_concrete());
        assert_eq!(q.variable_or_default(), Variable::Temperature);
    }
}
