//! Thin adapter around `qdrant-client`.
//!
//! Keeps the builder-heavy client API in one place; the rest of the crate
//! sees only [`VectorIndex`].

use std::collections::HashMap;

use futures::future::BoxFuture;
use qdrant_client::{
    Payload, Qdrant,
    qdrant::{
        CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
        UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
    },
};
use tracing::{debug, info, warn};

use super::{DocPayload, IndexHit, IndexedDoc, VectorIndex};
use crate::{config::KnowledgeConfig, errors::RagError};

pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
}

impl QdrantIndex {
    /// # Errors
    /// [`RagError::Config`] when no URL is configured, [`RagError::Qdrant`]
    /// when the client cannot be built.
    pub fn new(cfg: &KnowledgeConfig) -> Result<Self, RagError> {
        let url = cfg
            .qdrant_url
            .as_deref()
            .ok_or_else(|| RagError::Config("QDRANT_URL is not set".into()))?;

        let mut builder = Qdrant::from_url(url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build().map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
        })
    }

    /// Creates the collection (cosine distance) when it does not exist.
    pub async fn ensure_collection(&self, dim: usize) -> Result<(), RagError> {
        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!(collection = %self.collection, "collection already exists");
                return Ok(());
            }
            Err(err) => {
                warn!(collection = %self.collection, error = %err, "collection not found, creating");
            }
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dim as u64, Distance::Cosine)),
            )
            .await
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        info!(collection = %self.collection, dim, "collection created");
        Ok(())
    }
}

impl VectorIndex for QdrantIndex {
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        top_k: u64,
        score_floor: Option<f32>,
    ) -> BoxFuture<'a, Result<Vec<IndexHit>, RagError>> {
        Box::pin(async move {
            let mut builder =
                SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
            if let Some(floor) = score_floor {
                builder = builder.score_threshold(floor);
            }

            let res = self
                .client
                .search_points(builder)
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            let mut out = Vec::with_capacity(res.result.len());
            for point in res.result {
                let payload: DocPayload = serde_json::from_value(qpayload_to_json(point.payload))?;
                out.push(IndexHit {
                    score: point.score,
                    payload,
                });
            }
            debug!(hits = out.len(), "qdrant search completed");
            Ok(out)
        })
    }

    fn upsert<'a>(&'a self, docs: Vec<IndexedDoc>) -> BoxFuture<'a, Result<usize, RagError>> {
        Box::pin(async move {
            if docs.is_empty() {
                return Ok(0);
            }
            let mut points = Vec::with_capacity(docs.len());
            for doc in docs {
                let payload = Payload::try_from(serde_json::to_value(&doc.payload)?)
                    .map_err(|e| RagError::Qdrant(e.to_string()))?;
                points.push(PointStruct::new(doc.id, doc.vector, payload));
            }
            let n = points.len();
            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
            info!(collection = %self.collection, points = n, "upserted knowledge points");
            Ok(n)
        })
    }

    fn count<'a>(&'a self) -> BoxFuture<'a, Result<u64, RagError>> {
        Box::pin(async move {
            let res = self
                .client
                .count(CountPointsBuilder::new(&self.collection).exact(true))
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;
            Ok(res.result.map(|r| r.count).unwrap_or(0))
        })
    }
}

/// Converts a Qdrant payload into JSON. Nested values map to `Null`.
fn qpayload_to_json(mut p: HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::value::Kind;

    #[test]
    fn payload_roundtrips_into_doc() {
        let mut p = HashMap::new();
        for (k, v) in [("source_id", "qc_flags"), ("title", "QC"), ("text", "Flag 1 is good")] {
            p.insert(
                k.to_string(),
                QValue {
                    kind: Some(Kind::StringValue(v.to_string())),
                },
            );
        }
        let doc: DocPayload = serde_json::from_value(qpayload_to_json(p)).unwrap();
        assert_eq!(doc.source_id, "qc_flags");
        assert_eq!(doc.text, "Flag 1 is good");
    }
}
