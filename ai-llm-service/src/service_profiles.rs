//! Shared LLM service with three profiles: `fast`, `slow`, and `embedding`.
//!
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (provider+endpoint+model+key+timeout).
//! - Every generation is bounded by the profile timeout and retried once on
//!   transient failures.
//! - If `slow` profile is not provided, it falls back to `fast`.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::{
//!     config::default_config::profiles_from_env,
//!     generation::{GenerationRequest, Profile, TextGeneration},
//!     service_profiles::LlmServiceProfiles,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let p = profiles_from_env()?;
//! let svc = Arc::new(LlmServiceProfiles::new(p.fast, p.slow, p.embedding, Some(10))?);
//! let txt = svc
//!     .generate_text(GenerationRequest::text(Profile::Slow, None, "What is an Argo float?"))
//!     .await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    generation::{GenerationRequest, Profile, TextGeneration, system_with_schema},
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Automatic retries after the first attempt.
const MAX_RETRIES: u32 = 1;

pub struct LlmServiceProfiles {
    fast: LlmModelConfig,
    slow: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl std::fmt::Debug for LlmServiceProfiles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmServiceProfiles")
            .field("fast", &self.fast.model)
            .field("slow", &self.slow.model)
            .field("embedding", &self.embedding.model)
            .finish()
    }
}

impl LlmServiceProfiles {
    /// Creates a new service with three profiles.
    ///
    /// - `fast`: required fast profile (extraction).
    /// - `slow_opt`: optional slow profile (composition). If `None`, falls back to `fast`.
    /// - `embedding`: required embedding profile.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    pub fn new(
        fast: LlmModelConfig,
        slow_opt: Option<LlmModelConfig>,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        let slow = slow_opt.unwrap_or_else(|| fast.clone());

        Ok(Self {
            fast,
            slow,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Computes embeddings using the **embedding** profile (no retry).
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let timeout = self.embedding.request_timeout();
        let call = async {
            match self.embedding.provider {
                LlmProvider::Ollama => {
                    self.ollama_client(&self.embedding)
                        .await?
                        .embeddings(input)
                        .await
                }
                LlmProvider::OpenAI => {
                    self.openai_client(&self.embedding)
                        .await?
                        .embeddings(input)
                        .await
                }
            }
        };
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or(Err(AiLlmError::Timeout(timeout)))
    }

    /// Health snapshot for all distinct profiles.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = vec![self.fast.clone()];
        if self.slow != self.fast {
            list.push(self.slow.clone());
        }
        if self.embedding != self.fast && self.embedding != self.slow {
            list.push(self.embedding.clone());
        }
        self.health.check_many(&list).await
    }

    /// Current profiles `(fast, slow, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig, &LlmModelConfig) {
        (&self.fast, &self.slow, &self.embedding)
    }

    /* --------------------- Internals --------------------- */

    async fn generate_with_retry(
        &self,
        cfg: &LlmModelConfig,
        prompt: &str,
        system: Option<&str>,
        json_mode: bool,
    ) -> Result<String, AiLlmError> {
        let timeout = cfg.request_timeout();
        let mut attempt = 0;
        loop {
            let call = self.generate_once(cfg, prompt, system, json_mode);
            let result = tokio::time::timeout(timeout, call)
                .await
                .unwrap_or(Err(AiLlmError::Timeout(timeout)));

            match result {
                Err(err) if err.is_transient() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    warn!(model = %cfg.model, attempt, error = %err, "transient LLM failure, retrying");
                }
                other => return other,
            }
        }
    }

    async fn generate_once(
        &self,
        cfg: &LlmModelConfig,
        prompt: &str,
        system: Option<&str>,
        json_mode: bool,
    ) -> Result<String, AiLlmError> {
        match cfg.provider {
            LlmProvider::Ollama => {
                self.ollama_client(cfg)
                    .await?
                    .generate(prompt, system, json_mode)
                    .await
            }
            LlmProvider::OpenAI => {
                self.openai_client(cfg)
                    .await?
                    .generate(prompt, system, json_mode)
                    .await
            }
        }
    }

    async fn ollama_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        debug!(model = %cfg.model, "initializing Ollama client");
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn openai_client(&self, cfg: &LlmModelConfig) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        debug!(model = %cfg.model, "initializing OpenAI client");
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

impl TextGeneration for LlmServiceProfiles {
    fn generate_text<'a>(
        &'a self,
        request: GenerationRequest<'a>,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(async move {
            let cfg = match request.profile {
                Profile::Fast => &self.fast,
                Profile::Slow => &self.slow,
            };
            match request.schema_hint {
                Some(schema) => {
                    let system = system_with_schema(request.system, schema);
                    self.generate_with_retry(cfg, request.prompt, Some(&system), true)
                        .await
                }
                None => {
                    self.generate_with_retry(cfg, request.prompt, request.system, false)
                        .await
                }
            }
        })
    }
}

/// Cache key identifying one client configuration.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(1),
        }
    }

    #[tokio::test]
    async fn slow_falls_back_to_fast() {
        let svc = LlmServiceProfiles::new(cfg("fast"), None, cfg("emb"), Some(1)).unwrap();
        let (fast, slow, emb) = svc.profiles();
        assert_eq!(fast, slow);
        assert_eq!(emb.model, "emb");
    }

    #[tokio::test]
    async fn clients_are_cached_per_config() {
        let svc = LlmServiceProfiles::new(cfg("fast"), None, cfg("emb"), Some(1)).unwrap();
        let a = svc.ollama_client(&cfg("fast")).await.unwrap();
        let b = svc.ollama_client(&cfg("fast")).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        let c = svc.ollama_client(&cfg("emb")).await.unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
