//! Knowledge retrieval: embed → vector search → ranked snippets.

use std::{sync::Arc, time::Duration};

use ocean_model::KnowledgeSnippet;
use tracing::{debug, instrument, warn};

use crate::{
    config::KnowledgeConfig, embed::EmbeddingsProvider, errors::RagError, index::VectorIndex,
};

/// Snippets plus the reason retrieval degraded, if it did.
#[derive(Debug, Clone, Default)]
pub struct Retrieval {
    pub snippets: Vec<KnowledgeSnippet>,
    pub warning: Option<String>,
}

pub struct KnowledgeRetriever {
    embedder: Arc<dyn EmbeddingsProvider>,
    index: Arc<dyn VectorIndex>,
    score_floor: Option<f32>,
    timeout: Duration,
}

impl KnowledgeRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingsProvider>,
        index: Arc<dyn VectorIndex>,
        cfg: &KnowledgeConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            score_floor: (cfg.score_floor > 0.0).then_some(cfg.score_floor),
            timeout: cfg.timeout,
        }
    }

    /// Strict retrieval: up to `k` snippets, highest score first.
    ///
    /// # Errors
    /// Propagates embedding and index failures.
    pub async fn try_retrieve(
        &self,
        query_text: &str,
        k: usize,
    ) -> Result<Vec<KnowledgeSnippet>, RagError> {
        let text = query_text.trim();
        if k == 0 || text.is_empty() {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(text).await?;
        let hits = self.index.search(vector, k as u64, self.score_floor).await?;

        let mut snippets: Vec<KnowledgeSnippet> = hits
            .into_iter()
            .filter(|h| h.score.is_finite())
            .filter(|h| self.score_floor.is_none_or(|f| h.score >= f))
            .map(|h| KnowledgeSnippet {
                text: h.payload.text,
                score: h.score,
                source_id: h.payload.source_id,
            })
            .collect();
        snippets.sort_by(|a, b| b.score.total_cmp(&a.score));
        snippets.truncate(k);
        Ok(snippets)
    }

    /// Resilient retrieval bounded by the configured timeout.
    ///
    /// Never fails: any error yields no snippets and a warning.
    #[instrument(skip_all, fields(k = k))]
    pub async fn retrieve(&self, query_text: &str, k: usize) -> Retrieval {
        let outcome = tokio::time::timeout(self.timeout, self.try_retrieve(query_text, k))
            .await
            .unwrap_or(Err(RagError::Timeout(self.timeout)));

        match outcome {
            Ok(snippets) => {
                debug!(found = snippets.len(), "knowledge retrieved");
                Retrieval {
                    snippets,
                    warning: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "knowledge retrieval degraded");
                Retrieval {
                    snippets: Vec::new(),
                    warning: Some(format!("Background knowledge unavailable: {err}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DocPayload, IndexHit, IndexedDoc, MemoryIndex};
    use futures::future::BoxFuture;

    struct FixedEmbedder(Vec<f32>);

    impl EmbeddingsProvider for FixedEmbedder {
        fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
            Box::pin(async move { Ok(self.0.clone()) })
        }
    }

    struct DownIndex;

    impl VectorIndex for DownIndex {
        fn search<'a>(
            &'a self,
            _vector: Vec<f32>,
            _top_k: u64,
            _score_floor: Option<f32>,
        ) -> BoxFuture<'a, Result<Vec<IndexHit>, RagError>> {
            Box::pin(async { Err(RagError::Qdrant("connection refused".into())) })
        }
        fn upsert<'a>(&'a self, _docs: Vec<IndexedDoc>) -> BoxFuture<'a, Result<usize, RagError>> {
            Box::pin(async { Ok(0) })
        }
        fn count<'a>(&'a self) -> BoxFuture<'a, Result<u64, RagError>> {
            Box::pin(async { Ok(0) })
        }
    }

    async fn populated() -> Arc<MemoryIndex> {
        let idx = Arc::new(MemoryIndex::new());
        let docs = [
            ("x", vec![1.0, 0.0]),
            ("xy", vec![0.8, 0.6]),
            ("y", vec![0.0, 1.0]),
            ("nx", vec![-1.0, 0.0]),
        ]
        .into_iter()
        .map(|(id, v)| IndexedDoc {
            id: id.into(),
            vector: v,
            payload: DocPayload {
                source_id: id.into(),
                title: id.into(),
                text: format!("about {id}"),
            },
        })
        .collect();
        idx.upsert(docs).await.unwrap();
        idx
    }

    #[tokio::test]
    async fn returns_at_most_k_sorted() {
        let r = KnowledgeRetriever::new(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            populated().await,
            &KnowledgeConfig::default(),
        );
        let out = r.try_retrieve("salinity in the Bay of Bengal", 3).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].source_id, "x");
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn score_floor_filters_hits() {
        let cfg = KnowledgeConfig {
            score_floor: 0.5,
            ..KnowledgeConfig::default()
        };
        let r = KnowledgeRetriever::new(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            populated().await,
            &cfg,
        );
        let out = r.try_retrieve("q", 10).await.unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|s| s.score >= 0.5));
    }

    #[tokio::test]
    async fn outage_degrades_to_empty_with_warning() {
        let r = KnowledgeRetriever::new(
            Arc::new(FixedEmbedder(vec![1.0])),
            Arc::new(DownIndex),
            &KnowledgeConfig::default(),
        );
        let out = r.retrieve("anything", 3).await;
        assert!(out.snippets.is_empty());
        assert!(out.warning.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn zero_k_is_empty() {
        let r = KnowledgeRetriever::new(
            Arc::new(FixedEmbedder(vec![1.0, 0.0])),
            populated().await,
            &KnowledgeConfig::default(),
        );
        assert!(r.try_retrieve("q", 0).await.unwrap().is_empty());
    }
}
