//! Runtime configuration loaded from environment variables.

use std::time::Duration;

/// Budgets and knobs for one orchestrator instance. All fields have defaults.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Stage budgets. Each covers the LLM call including its single retry, so
    /// a value below twice `LLM_TIMEOUT_SECS` means timeouts are never retried.
    pub extract_timeout: Duration,
    pub compose_timeout: Duration,
    /// Whole-request deadline; past it the answer falls back to the template.
    pub request_deadline: Duration,

    /// Snippets requested from the knowledge retriever.
    pub context_k: usize,
    /// Character budget of the context block in the composer prompt.
    pub max_ctx_chars: usize,

    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub cache_capacity: usize,

    /// Warn when more than this share of records is dropped from a payload.
    pub viz_drop_warn_ratio: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extract_timeout: Duration::from_millis(15_000),
            compose_timeout: Duration::from_millis(20_000),
            request_deadline: Duration::from_millis(45_000),
            context_k: 3,
            max_ctx_chars: 2_500,
            cache_enabled: true,
            cache_ttl: Duration::from_secs(300),
            cache_capacity: 256,
            viz_drop_warn_ratio: 0.5,
        }
    }
}

impl PipelineConfig {
    /// Build from environment variables with defaults.
    ///
    /// `EXTRACT_TIMEOUT_MS`, `COMPOSE_TIMEOUT_MS`, `REQUEST_DEADLINE_MS`,
    /// `RAG_TOP_K`, `MAX_CTX_CHARS`, `CACHE_ENABLED`, `CACHE_TTL_SECS`,
    /// `CACHE_CAPACITY`, `VIZ_DROP_WARN_RATIO`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            extract_timeout: Duration::from_millis(parse("EXTRACT_TIMEOUT_MS", 15_000u64)),
            compose_timeout: Duration::from_millis(parse("COMPOSE_TIMEOUT_MS", 20_000u64)),
            request_deadline: Duration::from_millis(parse("REQUEST_DEADLINE_MS", 45_000u64)),
            context_k: parse("RAG_TOP_K", d.context_k),
            max_ctx_chars: parse("MAX_CTX_CHARS", d.max_ctx_chars),
            cache_enabled: env("CACHE_ENABLED", "true") == "true",
            cache_ttl: Duration::from_secs(parse("CACHE_TTL_SECS", 300u64)),
            cache_capacity: parse("CACHE_CAPACITY", d.cache_capacity),
            viz_drop_warn_ratio: parse("VIZ_DROP_WARN_RATIO", d.viz_drop_warn_ratio),
        }
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .map(|v| v.trim().to_ascii_lowercase())
        .unwrap_or_else(|_| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
