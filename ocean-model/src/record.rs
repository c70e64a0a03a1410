//! Float observations and the source-stamped records built from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ModelError, Result},
    query::MAX_OCEAN_DEPTH_M,
    region::validate_position,
    variable::Variable,
};

/// Quality-control class of a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QcFlag {
    Good,
    ProbablyGood,
    Bad,
    Missing,
}

impl QcFlag {
    /// Maps an Argo numeric QC flag.
    ///
    /// `1` good; `2`, `5` (changed) and `8` (estimated) are usable;
    /// `3` and `4` are bad; `9` or anything else counts as missing.
    pub fn from_argo(code: u8) -> QcFlag {
        match code {
            1 => QcFlag::Good,
            2 | 5 | 8 => QcFlag::ProbablyGood,
            3 | 4 => QcFlag::Bad,
            _ => QcFlag::Missing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QcFlag::Good => "good",
            QcFlag::ProbablyGood => "probably_good",
            QcFlag::Bad => "bad",
            QcFlag::Missing => "missing",
        }
    }

    pub fn is_usable(&self) -> bool {
        matches!(self, QcFlag::Good | QcFlag::ProbablyGood)
    }
}

/// Which provider in the chain produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Synthetic,
    Mock,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Synthetic => "synthetic",
            DataSource::Mock => "mock",
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated measurement as returned by a provider, before provenance is attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    float_id: String,
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
    depth: f64,
    values: BTreeMap<Variable, f64>,
    qc_flag: QcFlag,
}

impl Observation {
    /// # Errors
    /// [`ModelError::CoordinateOutOfRange`] for latitude outside `[-90, 90]`,
    /// longitude outside `[-180, 180]` or a negative/abyssal-overflow depth.
    pub fn new(
        float_id: impl Into<String>,
        latitude: f64,
        longitude: f64,
        timestamp: DateTime<Utc>,
        depth: f64,
        qc_flag: QcFlag,
    ) -> Result<Self> {
        validate_position(latitude, longitude)?;
        if !(depth.is_finite() && (0.0..=MAX_OCEAN_DEPTH_M).contains(&depth)) {
            return Err(ModelError::CoordinateOutOfRange {
                field: "depth",
                value: depth,
            });
        }
        Ok(Self {
            float_id: float_id.into(),
            latitude,
            longitude,
            timestamp,
            depth,
            values: BTreeMap::new(),
            qc_flag,
        })
    }

    /// Adds a measured value. Non-finite values are ignored.
    pub fn with_value(mut self, variable: Variable, value: f64) -> Self {
        if value.is_finite() {
            self.values.insert(variable, value);
        }
        self
    }

    pub fn float_id(&self) -> &str {
        &self.float_id
    }
    pub fn latitude(&self) -> f64 {
        self.latitude
    }
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    pub fn depth(&self) -> f64 {
        self.depth
    }
    pub fn value(&self, variable: Variable) -> Option<f64> {
        self.values.get(&variable).copied()
    }
    pub fn qc_flag(&self) -> QcFlag {
        self.qc_flag
    }

    /// Attaches provenance. Only the data source chain calls this.
    pub fn stamp(self, source: DataSource, retrieved_at: DateTime<Utc>) -> Record {
        Record {
            float_id: self.float_id,
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: self.timestamp,
            depth: self.depth,
            variable_values: self.values,
            qc_flag: self.qc_flag,
            source,
            retrieved_at,
        }
    }
}

/// One float measurement with provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    float_id: String,
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
    depth: f64,
    variable_values: BTreeMap<Variable, f64>,
    qc_flag: QcFlag,
    source: DataSource,
    retrieved_at: DateTime<Utc>,
}

impl Record {
    pub fn float_id(&self) -> &str {
        &self.float_id
    }
    pub fn latitude(&self) -> f64 {
        self.latitude
    }
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
    pub fn depth(&self) -> f64 {
        self.depth
    }
    pub fn value(&self, variable: Variable) -> Option<f64> {
        self.variable_values.get(&variable).copied()
    }
    pub fn variable_values(&self) -> &BTreeMap<Variable, f64> {
        &self.variable_values
    }
    pub fn qc_flag(&self) -> QcFlag {
        self.qc_flag
    }
    pub fn source(&self) -> DataSource {
        self.source
    }
    pub fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn observation_rejects_bad_coordinates() {
        assert!(Observation::new("f", 91.0, 0.0, t0(), 0.0, QcFlag::Good).is_err());
        assert!(Observation::new("f", 0.0, -180.5, t0(), 0.0, QcFlag::Good).is_err());
        assert!(Observation::new("f", 0.0, 0.0, t0(), -5.0, QcFlag::Good).is_err());
        assert!(Observation::new("f", 0.0, 0.0, t0(), f64::NAN, QcFlag::Good).is_err());
    }

    #[test]
    fn stamping_preserves_values() {
        let obs = Observation::new("2902746", 15.0, 88.0, t0(), 500.0, QcFlag::Good)
            .unwrap()
            .with_value(Variable::Temperature, 8.4)
            .with_value(Variable::Salinity, f64::INFINITY);
        let rec = obs.stamp(DataSource::Synthetic, t0());
        assert_eq!(rec.value(Variable::Temperature), Some(8.4));
        assert_eq!(rec.value(Variable::Salinity), None);
        assert_eq!(rec.source(), DataSource::Synthetic);
    }

    #[test]
    fn argo_flag_mapping() {
        assert_eq!(QcFlag::from_argo(1), QcFlag::Good);
        assert_eq!(QcFlag::from_argo(8), QcFlag::ProbablyGood);
        assert_eq!(QcFlag::from_argo(4), QcFlag::Bad);
        assert_eq!(QcFlag::from_argo(9), QcFlag::Missing);
        assert!(!QcFlag::Bad.is_usable());
    }
}
