//! ERDDAP tabledap client for the `ArgoFloats` dataset.
//!
//! - `GET {base}/tabledap/ArgoFloats.json?<columns>&<constraints>`
//!
//! Only core Argo variables are published there (temperature, salinity,
//! pressure); everything else is reported as unsupported so the chain falls
//! through to the next provider.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use ocean_model::{Observation, QcFlag, Variable};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{FloatApi, LiveRequest};
use crate::error::ProviderFailure;

pub const DATASET_ID: &str = "ArgoFloats";
/// Rows kept from a single response.
pub const MAX_ROWS: usize = 2_000;

/// ERDDAP column names for the value and QC of `variable`.
pub fn columns_for(variable: Variable) -> Option<(&'static str, &'static str)> {
    match variable {
        Variable::Temperature => Some(("temp", "temp_qc")),
        Variable::Salinity => Some(("psal", "psal_qc")),
        Variable::Pressure => Some(("pres", "pres_qc")),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ErddapClient {
    client: reqwest::Client,
    base: String,
    timeout: Duration,
}

impl ErddapClient {
    /// # Errors
    /// [`ProviderFailure::Transport`] if the URL lacks http/https or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderFailure> {
        let base = base_url.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ProviderFailure::Transport(format!(
                "invalid ERDDAP endpoint: {base_url:?}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderFailure::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base: base.to_string(),
            timeout,
        })
    }

    /// Full tabledap URL for `request`.
    ///
    /// # Errors
    /// [`ProviderFailure::Unsupported`] for variables the dataset lacks.
    pub fn url_for(&self, request: &LiveRequest) -> Result<String, ProviderFailure> {
        let (value_col, qc_col) = columns_for(request.variable).ok_or_else(|| {
            ProviderFailure::Unsupported(format!(
                "{} is not published by {DATASET_ID}",
                request.variable
            ))
        })?;

        let mut columns = vec!["platform_number", "time", "latitude", "longitude", "pres"];
        if value_col != "pres" {
            columns.push(value_col);
        }
        columns.push(qc_col);

        let b = request.bbox;
        let ts = |t: DateTime<Utc>| t.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let constraints = [
            format!("latitude%3E={}", b.min_lat()),
            format!("latitude%3C={}", b.max_lat()),
            format!("longitude%3E={}", b.min_lon()),
            format!("longitude%3C={}", b.max_lon()),
            format!("pres%3E={}", request.depth.min()),
            format!("pres%3C={}", request.depth.max()),
            format!("time%3E={}", ts(request.time.start())),
            format!("time%3C={}", ts(request.time.end())),
        ];

        Ok(format!(
            "{}/tabledap/{DATASET_ID}.json?{}&{}",
            self.base,
            columns.join(","),
            constraints.join("&")
        ))
    }

    #[instrument(skip_all, fields(variable = request.variable.as_str()))]
    async fn fetch(&self, request: &LiveRequest) -> Result<Vec<Observation>, ProviderFailure> {
        let url = self.url_for(request)?;
        debug!("GET {url}");

        let resp = self.client.get(&url).send().await.map_err(|e| self.classify(e))?;
        let status = resp.status();
        // ERDDAP answers 404 when the constraints match no rows.
        if status == StatusCode::NOT_FOUND {
            debug!("no matching rows");
            return Ok(Vec::new());
        }
        if !status.is_success() {
            warn!(%status, %url, "ERDDAP returned non-success status");
            return Err(ProviderFailure::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = resp.text().await.map_err(|e| self.classify(e))?;
        parse_table(&body, request.variable)
    }

    fn classify(&self, e: reqwest::Error) -> ProviderFailure {
        if e.is_timeout() {
            ProviderFailure::Timeout(self.timeout)
        } else {
            e.into()
        }
    }
}

impl FloatApi for ErddapClient {
    fn fetch_live_observations<'a>(
        &'a self,
        request: &'a LiveRequest,
    ) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>> {
        Box::pin(self.fetch(request))
    }
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    table: Table,
}

#[derive(Debug, Deserialize)]
struct Table {
    #[serde(rename = "columnNames")]
    column_names: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

/// Decodes an ERDDAP `.json` table into observations of `variable`.
///
/// Rows with invalid coordinates or no value are dropped here, so nothing
/// downstream sees them.
///
/// # Errors
/// [`ProviderFailure::Decode`] for malformed JSON or missing columns.
pub fn parse_table(json: &str, variable: Variable) -> Result<Vec<Observation>, ProviderFailure> {
    let (value_col, qc_col) = columns_for(variable)
        .ok_or_else(|| ProviderFailure::Unsupported(variable.as_str().to_string()))?;
    let resp: TableResponse =
        serde_json::from_str(json).map_err(|e| ProviderFailure::Decode(e.to_string()))?;
    let table = resp.table;

    let col = |name: &str| {
        table
            .column_names
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ProviderFailure::Decode(format!("missing column `{name}`")))
    };
    let (i_id, i_time, i_lat, i_lon, i_pres) = (
        col("platform_number")?,
        col("time")?,
        col("latitude")?,
        col("longitude")?,
        col("pres")?,
    );
    let (i_val, i_qc) = (col(value_col)?, col(qc_col)?);

    let total = table.rows.len();
    let out: Vec<Observation> = table
        .rows
        .iter()
        .take(MAX_ROWS)
        .filter_map(|row| {
            let id = as_text(row.get(i_id)?)?;
            let time = DateTime::parse_from_rfc3339(&as_text(row.get(i_time)?)?)
                .ok()?
                .with_timezone(&Utc);
            let lat = as_f64(row.get(i_lat)?)?;
            let lon = as_f64(row.get(i_lon)?)?;
            let pres = as_f64(row.get(i_pres)?)?;
            let value = as_f64(row.get(i_val)?)?;
            let qc = row
                .get(i_qc)
                .and_then(as_f64)
                .map(|c| QcFlag::from_argo(c as u8))
                .unwrap_or(QcFlag::Missing);
            Observation::new(id.trim(), lat, lon, time, pres, qc)
                .ok()
                .map(|o| o.with_value(variable, value))
        })
        .collect();

    if out.len() < total.min(MAX_ROWS) {
        debug!(kept = out.len(), total, "dropped invalid ERDDAP rows");
    }
    Ok(out)
}

fn as_f64(v: &Value) -> Option<f64> {
    let x: Option<f64> = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    x.filter(|x| x.is_finite())
}

fn as_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
