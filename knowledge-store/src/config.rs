//! Retrieval configuration loaded from environment variables.

use std::time::Duration;

use crate::errors::RagError;

#[derive(Clone, Debug)]
pub struct KnowledgeConfig {
    /// Qdrant URL; `None` selects the in-memory index.
    pub qdrant_url: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    pub embedding_dim: usize,
    pub top_k: usize,
    /// Hits scoring below this are dropped (`0.0` keeps everything non-negative).
    pub score_floor: f32,
    pub timeout: Duration,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            qdrant_url: None,
            qdrant_api_key: None,
            collection: "ocean_knowledge".to_string(),
            embedding_dim: 1024,
            top_k: 3,
            score_floor: 0.0,
            timeout: Duration::from_millis(4000),
        }
    }
}

impl KnowledgeConfig {
    /// Build from environment variables with defaults.
    ///
    /// `QDRANT_URL`, `QDRANT_API_KEY`, `QDRANT_COLLECTION`, `EMBEDDING_DIM`,
    /// `RAG_TOP_K`, `RAG_SCORE_FLOOR`, `RAG_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            qdrant_url: non_empty("QDRANT_URL"),
            qdrant_api_key: non_empty("QDRANT_API_KEY"),
            collection: non_empty("QDRANT_COLLECTION").unwrap_or(d.collection),
            embedding_dim: parse("EMBEDDING_DIM", d.embedding_dim),
            top_k: parse("RAG_TOP_K", d.top_k),
            score_floor: parse("RAG_SCORE_FLOOR", d.score_floor),
            timeout: Duration::from_millis(parse("RAG_TIMEOUT_MS", 4000u64)),
        }
    }

    pub fn validate(&self) -> Result<(), RagError> {
        if self.embedding_dim == 0 {
            return Err(RagError::Config("EMBEDDING_DIM must be > 0".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection name must not be empty".into()));
        }
        if let Some(url) = &self.qdrant_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RagError::Config(format!("QDRANT_URL must be http(s): {url}")));
            }
        }
        Ok(())
    }
}

fn non_empty(k: &str) -> Option<String> {
    std::env::var(k).ok().filter(|v| !v.trim().is_empty())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dim_and_bad_url() {
        let mut cfg = KnowledgeConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.embedding_dim = 0;
        assert!(cfg.validate().is_err());
        cfg.embedding_dim = 8;
        cfg.qdrant_url = Some("localhost:6334".into());
        assert!(cfg.validate().is_err());
    }
}
