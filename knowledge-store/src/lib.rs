//! Knowledge retrieval for answer augmentation.
//!
//! - [`EmbeddingsProvider`]: text → vector (LLM embedding profile in production).
//! - [`VectorIndex`]: Qdrant or in-memory nearest-neighbour search.
//! - [`KnowledgeRetriever`]: strict [`try_retrieve`](KnowledgeRetriever::try_retrieve)
//!   and resilient [`retrieve`](KnowledgeRetriever::retrieve).
//! - [`corpus::seed_if_empty`]: loads the built-in oceanography notes.

pub mod config;
pub mod corpus;
pub mod embed;
pub mod errors;
pub mod index;
mod retriever;

pub use config::KnowledgeConfig;
pub use embed::{EmbeddingsProvider, LlmEmbedder};
pub use errors::RagError;
pub use index::{DocPayload, IndexHit, IndexedDoc, MemoryIndex, QdrantIndex, VectorIndex, open_index};
pub use retriever::{KnowledgeRetriever, Retrieval};
