//! CSV rendering of records for export requests.

use ocean_model::{Record, Variable};

/// CSV with a fixed column prefix followed by one column per variable present.
///
/// Missing values are left empty.
pub fn records_to_csv(records: &[Record]) -> String {
    let variables = variables_present(records);

    let mut out = String::from("float_id,latitude,longitude,timestamp,depth_m");
    for v in &variables {
        out.push(',');
        out.push_str(v.as_str());
    }
    out.push_str(",qc_flag,source\n");

    for r in records {
        out.push_str(&escape(r.float_id()));
        out.push_str(&format!(
            ",{:.4},{:.4},{},{:.1}",
            r.latitude(),
            r.longitude(),
            r.timestamp().to_rfc3339(),
            r.depth()
        ));
        for v in &variables {
            out.push(',');
            if let Some(x) = r.value(*v) {
                out.push_str(&format!("{x:.4}"));
            }
        }
        out.push(',');
        out.push_str(r.qc_flag().as_str());
        out.push(',');
        out.push_str(r.source().as_str());
        out.push('\n');
    }
    out
}

/// Variables appearing in at least one record, in canonical order.
pub fn variables_present(records: &[Record]) -> Vec<Variable> {
    Variable::ALL
        .into_iter()
        .filter(|v| records.iter().any(|r| r.value(*v).is_some()))
        .collect()
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
