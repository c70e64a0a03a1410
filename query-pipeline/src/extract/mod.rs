//! Parameter extraction: free text to a validated [`Query`].
//!
//! The model is asked for a fixed JSON shape; each field is validated on its
//! own. When the model is unreachable the keyword extractor answers instead.

mod fields;
mod keywords;
mod relative;
mod schema;

use std::{sync::Arc, time::Duration};

use ai_llm_service::{AiLlmError, GenerationRequest, TextGeneration};
use chrono::{DateTime, Utc};
use ocean_model::{Query, UserRole};
use tracing::{instrument, warn};

use crate::error::ExtractionError;

pub use fields::{cleanup_json_like, find_json_object, query_from_output};
pub use keywords::keyword_query;
pub use relative::{RECENT_DAYS, parse_date, relative_window, year_window};

/// Query plus the degradations that happened while producing it.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub query: Query,
    pub warnings: Vec<String>,
}

pub struct ParameterExtractor {
    llm: Arc<dyn TextGeneration>,
    timeout: Duration,
}

impl ParameterExtractor {
    pub fn new(llm: Arc<dyn TextGeneration>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    pub async fn extract(
        &self,
        raw_text: &str,
        role: UserRole,
    ) -> Result<Extraction, ExtractionError> {
        self.extract_at(raw_text, role, Utc::now()).await
    }

    /// [`extract`](Self::extract) with an explicit "now" for relative time expressions.
    ///
    /// Unparseable output yields the default query with a warning. Transient
    /// failures (timeouts, 5xx, transport) switch to keyword extraction. Any
    /// other generation error is returned.
    #[instrument(skip_all, fields(role = role.as_str()))]
    pub async fn extract_at(
        &self,
        raw_text: &str,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<Extraction, ExtractionError> {
        if raw_text.trim().is_empty() {
            return Ok(Extraction {
                query: Query::new(raw_text, role),
                warnings: vec!["Question was empty; default parameters were used.".into()],
            });
        }

        let prompt = schema::build_prompt(raw_text, now);
        let req = GenerationRequest::structured(Some(schema::SYSTEM), &prompt, schema::SCHEMA_HINT);
        let result = match tokio::time::timeout(self.timeout, self.llm.generate_text(req)).await {
            Ok(r) => r,
            Err(_) => Err(AiLlmError::Timeout(self.timeout)),
        };

        match result {
            Ok(output) => match query_from_output(&output, raw_text, role, now) {
                Some(query) => Ok(Extraction {
                    query,
                    warnings: Vec::new(),
                }),
                None => {
                    warn!(len = output.len(), "extraction output had no JSON object");
                    Ok(Extraction {
                        query: Query::new(raw_text, role),
                        warnings: vec![
                            "Could not interpret the question precisely; default parameters were used."
                                .into(),
                        ],
                    })
                }
            },
            Err(e) if e.is_transient() => {
                warn!(error = %e, "extraction model unavailable; using keyword extraction");
                Ok(Extraction {
                    query: keyword_query(raw_text, role, now),
                    warnings: vec![format!(
                        "Language model unavailable ({e}); parameters were read from keywords."
                    )],
                })
            }
            Err(e) => Err(ExtractionError::Generation(e)),
        }
    }
}
