use serde::{Deserialize, Serialize};

/// A passage of domain knowledge retrieved for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    pub text: String,
    pub score: f32,
    pub source_id: String,
}
