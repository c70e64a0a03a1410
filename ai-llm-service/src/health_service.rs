//! Health probes for LLM backends.
//!
//! - Ollama: `GET {endpoint}/api/tags`
//! - OpenAI: `GET {endpoint}/v1/models` with Bearer auth
//!
//! Both probes check that the configured model is listed. [`HealthService::check`]
//! never fails (errors become `ok = false`); [`HealthService::try_probe`] is strict.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, HealthError, HttpError, make_snippet},
};

/// Serializable health snapshot for one profile.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Reuses one HTTP client for all probes.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// # Errors
    /// [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let default_timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder()
            .timeout(default_timeout)
            .build()?;
        Ok(Self {
            client,
            default_timeout,
        })
    }

    /// Resilient probe; failures are reported in the returned status.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe(cfg).await {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    model = %status.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status = HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    pub async fn check_many(&self, configs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        debug!(count = configs.len(), "running batch health probes");
        let mut out = Vec::with_capacity(configs.len());
        for cfg in configs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Strict probe. `Ok` with `ok = false` means the server answered but the
    /// model is not listed.
    pub async fn try_probe(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let base = cfg.endpoint.trim().trim_end_matches('/');
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let (url, auth) = match cfg.provider {
            LlmProvider::Ollama => (format!("{base}/api/tags"), None),
            LlmProvider::OpenAI => {
                let key = cfg
                    .api_key
                    .as_deref()
                    .ok_or_else(|| HealthError::Decode("missing OpenAI API key".into()))?;
                (format!("{base}/v1/models"), Some(format!("Bearer {key}")))
            }
        };

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);
        let mut req = self.client.get(&url).timeout(timeout);
        if let Some(auth) = auth {
            req = req.header(header::AUTHORIZATION, auth);
        }

        let start = Instant::now();
        debug!(provider = ?cfg.provider, "GET {}", url);
        let resp = req.send().await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet,
            })
            .into());
        }

        let listing: ModelListing = match resp.json().await {
            Ok(l) => l,
            Err(e) => {
                return Ok(HealthStatus::new(
                    cfg,
                    true,
                    latency,
                    format!("server reachable; model list undecodable: {e}"),
                ));
            }
        };

        if listing.names().any(|n| n == cfg.model) {
            Ok(HealthStatus::new(cfg, true, latency, "model is available"))
        } else {
            Ok(HealthStatus::new(
                cfg,
                false,
                latency,
                "server is up, but model is not listed",
            ))
        }
    }
}

/// Union of `/api/tags` (`models[].name`) and `/v1/models` (`data[].id`).
#[derive(Debug, Default, Deserialize)]
struct ModelListing {
    #[serde(default)]
    models: Vec<NamedModel>,
    #[serde(default)]
    data: Vec<IdModel>,
}

#[derive(Debug, Deserialize)]
struct NamedModel {
    name: String,
}

#[derive(Debug, Deserialize)]
struct IdModel {
    id: String,
}

impl ModelListing {
    fn names(&self) -> impl Iterator<Item = &str> {
        self.models
            .iter()
            .map(|m| m.name.as_str())
            .chain(self.data.iter().map(|m| m.id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_reads_both_shapes() {
        let ollama: ModelListing =
            serde_json::from_str(r#"{"models":[{"name":"qwen3:8b"}]}"#).unwrap();
        assert_eq!(ollama.names().collect::<Vec<_>>(), vec!["qwen3:8b"]);

        let openai: ModelListing =
            serde_json::from_str(r#"{"object":"list","data":[{"id":"gpt-4o-mini"}]}"#).unwrap();
        assert_eq!(openai.names().collect::<Vec<_>>(), vec!["gpt-4o-mini"]);
    }

    #[tokio::test]
    async fn invalid_endpoint_is_reported_not_raised() {
        let svc = HealthService::new(Some(1)).unwrap();
        let cfg = LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "m".into(),
            endpoint: "ftp://nowhere".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        };
        let status = svc.check(&cfg).await;
        assert!(!status.ok);
        assert!(status.message.contains("invalid endpoint"));
    }
}
