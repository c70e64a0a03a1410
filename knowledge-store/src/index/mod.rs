//! Vector index abstraction with Qdrant and in-memory implementations.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{config::KnowledgeConfig, errors::RagError};

pub mod memory;
pub mod qdrant;

pub use memory::MemoryIndex;
pub use qdrant::QdrantIndex;

/// Document metadata stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocPayload {
    pub source_id: String,
    pub title: String,
    pub text: String,
}

/// A document ready for upsert.
#[derive(Debug, Clone)]
pub struct IndexedDoc {
    /// Stable point id (UUID string).
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: DocPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub score: f32,
    pub payload: DocPayload,
}

/// Nearest-neighbour search over document vectors.
pub trait VectorIndex: Send + Sync {
    /// Top `top_k` hits by similarity; hits below `score_floor` are excluded.
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
        score_floor: Option<f32>,
    ) -> BoxFuture<'a, Result<Vec<IndexHit>, RagError>>;

    /// Inserts or replaces documents by id. Returns the number written.
    fn upsert<'a>(&'a self, docs: Vec<IndexedDoc>) -> BoxFuture<'a, Result<usize, RagError>>;

    fn count<'a>(&'a self) -> BoxFuture<'a, Result<u64, RagError>>;
}

/// Qdrant when `qdrant_url` is configured, otherwise an in-memory index.
pub async fn open_index(cfg: &KnowledgeConfig) -> Result<Arc<dyn VectorIndex>, RagError> {
    cfg.validate()?;
    match &cfg.qdrant_url {
        Some(url) => {
            let index = QdrantIndex::new(cfg)?;
            index.ensure_collection(cfg.embedding_dim).await?;
            info!(%url, collection = %cfg.collection, "using Qdrant knowledge index");
            Ok(Arc::new(index))
        }
        None => {
            info!("QDRANT_URL unset, using in-memory knowledge index");
            Ok(Arc::new(MemoryIndex::new()))
        }
    }
}
