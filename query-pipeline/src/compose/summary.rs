//! Compact statistics over retrieved records, shared by prompts and templates.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use ocean_model::{DataSource, QcSummary, Record, Variable};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: usize,
}

impl Stats {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let (mut min, mut max, mut sum) = (f64::INFINITY, f64::NEG_INFINITY, 0.0);
        for v in values.into_iter().filter(|v| v.is_finite()) {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            sum += v;
        }
        (count > 0).then(|| Self {
            min,
            max,
            mean: sum / count as f64,
            count,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub variable: Variable,
    pub record_count: usize,
    pub floats: usize,
    /// `None` when no record carries the variable.
    pub values: Option<Stats>,
    pub depth_span: Option<(f64, f64)>,
    pub time_span: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub qc: QcSummary,
    pub source: Option<DataSource>,
}

impl RecordSummary {
    pub fn new(variable: Variable, records: &[Record], source: Option<DataSource>) -> Self {
        let values = Stats::of(
            records
                .iter()
                .filter(|r| r.qc_flag().is_usable())
                .filter_map(|r| r.value(variable)),
        );
        let depth = Stats::of(records.iter().map(|r| r.depth()));
        let time_span = records
            .iter()
            .map(|r| r.timestamp())
            .fold(None, |acc: Option<(DateTime<Utc>, DateTime<Utc>)>, t| match acc {
                None => Some((t, t)),
                Some((a, b)) => Some((a.min(t), b.max(t))),
            });
        let floats = records
            .iter()
            .map(|r| r.float_id())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            variable,
            record_count: records.len(),
            floats,
            values,
            depth_span: depth.map(|d| (d.min, d.max)),
            time_span,
            qc: QcSummary::from_records(records),
            source,
        }
    }

    /// Plain-text lines for prompts and fallback answers.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} records from {} float(s)",
            self.record_count, self.floats
        );
        if let Some(src) = self.source {
            out.push_str(&format!(" ({src} data)"));
        }
        out.push('\n');

        let units = self.variable.units();
        match self.values {
            Some(s) => out.push_str(&format!(
                "{}: mean {:.2} {units}, range {:.2} to {:.2} {units} over {} good value(s)\n",
                self.variable, s.mean, s.min, s.max, s.count
            )),
            None => out.push_str(&format!("{}: no usable values\n", self.variable)),
        }
        if let Some((a, b)) = self.depth_span {
            if a == b {
                out.push_str(&format!("depth: {a:.0} m\n"));
            } else {
                out.push_str(&format!("depth: {a:.0} to {b:.0} m\n"));
            }
        }
        if let Some((a, b)) = self.time_span {
            out.push_str(&format!(
                "time: {} to {}\n",
                a.format("%Y-%m-%d"),
                b.format("%Y-%m-%d")
            ));
        }
        out.push_str(&format!(
            "quality: {} good, {} probably good, {} bad, {} missing\n",
            self.qc.good, self.qc.probably_good, self.qc.bad, self.qc.missing
        ));
        out
    }
}
