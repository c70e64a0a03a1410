//! Brute-force cosine index held in process memory.

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use super::{IndexHit, IndexedDoc, VectorIndex};
use crate::errors::RagError;

#[derive(Debug, Default)]
pub struct MemoryIndex {
    docs: RwLock<Vec<IndexedDoc>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for MemoryIndex {
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
        score_floor: Option<f32>,
    ) -> BoxFuture<'a, Result<Vec<IndexHit>, RagError>> {
        Box::pin(async move {
            let docs = self.docs.read().await;
            let mut hits: Vec<IndexHit> = docs
                .iter()
                .map(|d| IndexHit {
                    score: cosine(&vector, &d.vector),
                    payload: d.payload.clone(),
                })
                .filter(|h| score_floor.is_none_or(|f| h.score >= f))
                .collect();
            hits.sort_by(|a, b| b.score.total_cmp(&a.score));
            hits.truncate(top_k as usize);
            Ok(hits)
        })
    }

    fn upsert<'a>(&'a self, docs: Vec<IndexedDoc>) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            let mut stored = self.docs.write().await;
            let n = docs.len();
            for doc in docs {
                match stored.iter_mut().find(|d| d.id == doc.id) {
                    Some(slot) => *slot = doc,
                    None => stored.push(doc),
                }
            }
            Ok(n)
        })
    }

    fn count<'a>(&'a self) -> BoxFuture<'a, Result<u64, RagError>> {
        Box::pin(async move { Ok(self.docs.read().await.len() as u64) })
    }
}

pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}
