//! Deterministic answer used when generation fails or the deadline passes.

use ocean_model::{DataSource, Query};

use super::summary::RecordSummary;

/// Templated answer built from record statistics. Never empty.
pub fn fallback_answer(query: &Query, summary: &RecordSummary) -> String {
    let variable = summary.variable;
    let units = variable.units();
    let place = query
        .region
        .map(|r| format!(" in the {}", r.label()))
        .unwrap_or_default();
    let depth = match summary.depth_span {
        Some((a, b)) if a == b => format!(" at {a:.0} m"),
        Some((a, b)) => format!(" between {a:.0} and {b:.0} m"),
        None => String::new(),
    };

    let mut out = match summary.values {
        Some(s) if s.count == 1 => format!(
            "One {variable} measurement{place}{depth} reads {:.2} {units}.",
            s.mean
        ),
        Some(s) => format!(
            "Across {} {variable} measurements{place}{depth}, values range from {:.2} to {:.2} {units} \
             with a mean of {:.2} {units}.",
            s.count, s.min, s.max, s.mean
        ),
        None if summary.record_count == 0 => {
            format!("No {variable} measurements were found{place}{depth}.")
        }
        None => format!(
            "{} records were found{place}{depth}, but none carries a usable {variable} value.",
            summary.record_count
        ),
    };

    if let Some((a, b)) = summary.time_span {
        out.push_str(&format!(
            " Observations span {} to {}.",
            a.format("%Y-%m-%d"),
            b.format("%Y-%m-%d")
        ));
    }
    match summary.source {
        Some(DataSource::Live) => out.push_str(" Data comes from live Argo floats."),
        Some(DataSource::Synthetic) => {
            out.push_str(" These are synthetic values from a climatological model, not live measurements.")
        }
        Some(DataSource::Mock) => out.push_str(" These are illustrative mock values."),
        None => {}
    }
    out
}
