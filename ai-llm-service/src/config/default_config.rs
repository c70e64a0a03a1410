//! Default LLM configs loaded strictly from environment variables.
//!
//! Three roles per provider:
//!
//! - **Slow**      → answer composition (quality)
//! - **Fast**      → parameter extraction in JSON mode (speed)
//! - **Embedding** → knowledge retrieval vectors
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = `ollama` (default) or `openai`
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = per-attempt timeout for generation (default 7)
//!
//! Ollama:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = slow/quality model (mandatory)
//! - `OLLAMA_MODEL_FAST`           = fast model (optional, falls back to `OLLAMA_MODEL`)
//! - `EMBEDDING_MODEL`             = embedding model (mandatory)
//!
//! OpenAI-compatible:
//! - `OPENAI_API_KEY` (mandatory), `OPENAI_BASE_URL` (default `https://api.openai.com`)
//! - `OPENAI_MODEL` (default `gpt-4o-mini`), `OPENAI_MODEL_FAST` (optional)
//! - `OPENAI_EMBEDDING_MODEL` (default `text-embedding-3-small`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, must_env, opt_env, validate_http_endpoint,
    },
};

/// Per-attempt generation timeout when `LLM_TIMEOUT_SECS` is unset.
///
/// Callers budget whole stages around this; a stage must fit two attempts for
/// a timed-out attempt to be retried.
pub const DEFAULT_TIMEOUT_SECS: u64 = 7;
const EMBEDDING_TIMEOUT_SECS: u64 = 15;

/// The three profile configs resolved for the selected provider.
#[derive(Debug, Clone)]
pub struct ProfileConfigs {
    pub fast: LlmModelConfig,
    pub slow: Option<LlmModelConfig>,
    pub embedding: LlmModelConfig,
}

/// Resolves all profiles for the provider named by `LLM_KIND`.
///
/// # Errors
/// [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`, plus any
/// error from the provider-specific constructors.
pub fn profiles_from_env() -> Result<ProfileConfigs, AiLlmError> {
    let kind = opt_env("LLM_KIND")
        .map(|k| k.parse::<LlmProvider>())
        .transpose()?
        .unwrap_or(LlmProvider::Ollama);

    match kind {
        LlmProvider::Ollama => Ok(ProfileConfigs {
            fast: config_ollama_fast()?,
            slow: Some(config_ollama_slow()?),
            embedding: config_ollama_embedding()?,
        }),
        LlmProvider::OpenAI => Ok(ProfileConfigs {
            fast: config_openai_fast()?,
            slow: Some(config_openai_slow()?),
            embedding: config_openai_embedding()?,
        }),
    }
}

fn generation_timeout() -> Result<u64, AiLlmError> {
    Ok(env_opt_u32("LLM_TIMEOUT_SECS")?
        .map(u64::from)
        .unwrap_or(DEFAULT_TIMEOUT_SECS))
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = opt_env("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_env("OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

/// Quality model used to compose answers.
///
/// # Env
/// - `OLLAMA_MODEL` (required)
pub fn config_ollama_slow() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: must_env("OLLAMA_MODEL")?,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.3),
        top_p: Some(0.9),
        timeout_secs: Some(generation_timeout()?),
    })
}

/// Fast model used for structured extraction; low temperature keeps JSON stable.
///
/// # Env
/// - `OLLAMA_MODEL_FAST` (optional, defaults to `OLLAMA_MODEL`)
pub fn config_ollama_fast() -> Result<LlmModelConfig, AiLlmError> {
    let model = match opt_env("OLLAMA_MODEL_FAST") {
        Some(m) => m,
        None => must_env("OLLAMA_MODEL")?,
    };
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(generation_timeout()?),
    })
}

/// # Env
/// - `EMBEDDING_MODEL` (required)
pub fn config_ollama_embedding() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: must_env("EMBEDDING_MODEL")?,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(EMBEDDING_TIMEOUT_SECS),
    })
}

fn openai_base() -> Result<String, AiLlmError> {
    let url = opt_env("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com".to_string());
    validate_http_endpoint("OPENAI_BASE_URL", &url)?;
    Ok(url)
}

fn openai_model(var: &'static str, fallback: &str) -> String {
    opt_env(var).unwrap_or_else(|| fallback.to_string())
}

pub fn config_openai_slow() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: openai_model("OPENAI_MODEL", "gpt-4o-mini"),
        endpoint: openai_base()?,
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.3),
        top_p: None,
        timeout_secs: Some(generation_timeout()?),
    })
}

pub fn config_openai_fast() -> Result<LlmModelConfig, AiLlmError> {
    let fallback = openai_model("OPENAI_MODEL", "gpt-4o-mini");
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: openai_model("OPENAI_MODEL_FAST", &fallback),
        endpoint: openai_base()?,
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(generation_timeout()?),
    })
}

pub fn config_openai_embedding() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: openai_model("OPENAI_EMBEDDING_MODEL", "text-embedding-3-small"),
        endpoint: openai_base()?,
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(EMBEDDING_TIMEOUT_SECS),
    })
}
