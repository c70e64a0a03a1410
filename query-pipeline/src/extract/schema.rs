//! Prompt and schema for structured parameter extraction.

use chrono::{DateTime, Utc};
use ocean_model::{NamedSea, Variable};

/// System instructions for the extraction call.
pub const SYSTEM: &str = r#"
You convert questions about ocean float data into search parameters.
Only fill a field when the question determines it; otherwise use null.
Never invent coordinates for a region that has a name in the list below.
"#;

/// Fixed JSON shape requested from the model.
pub const SCHEMA_HINT: &str = r#"{
  "region_name": "string | null  (one of the named regions)",
  "bbox": "[min_lon, min_lat, max_lon, max_lat] | null  (only for explicit coordinates)",
  "variable": "string | null  (one of the variables)",
  "depth_min": "number | null  (meters, >= 0)",
  "depth_max": "number | null  (meters, <= 11000)",
  "time_start": "string | null  (ISO-8601 date, or relative such as \"last 3 years\")",
  "time_end": "string | null  (ISO-8601 date)",
  "intent": "lookup | trend | compare | export"
}"#;

/// User prompt: the question plus the vocabulary the fields must come from.
pub fn build_prompt(question: &str, now: DateTime<Utc>) -> String {
    let regions = NamedSea::ALL
        .iter()
        .map(|s| s.display_name())
        .collect::<Vec<_>>()
        .join(", ");
    let variables = Variable::ALL
        .iter()
        .map(|v| v.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Today is {today}.\n\
         Named regions: {regions}\n\
         Variables: {variables}\n\
         Intent: \"trend\" for change over time, \"compare\" for comparisons, \
         \"export\" for downloads, otherwise \"lookup\".\n\
\n\
         Question:\n{question}\n",
        today = now.format("%Y-%m-%d"),
        question = question.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prompt_lists_vocabulary() {
        let now = Utc.with_ymd_and_hms(2025, 2, 3, 0, 0, 0).unwrap();
        let p = build_prompt("  salinity near Sri Lanka ", now);
        assert!(p.contains("Today is 2025-02-03."));
        assert!(p.contains("Bay of Bengal"));
        assert!(p.contains("chlorophyll"));
        assert!(p.ends_with("salinity near Sri Lanka\n"));
    }
}
