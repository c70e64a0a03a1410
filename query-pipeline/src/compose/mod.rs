//! Response composition: role-aware prose grounded in the records and snippets.
//!
//! - [`ResponseComposer::try_compose`]: strict, one generation call.
//! - [`ResponseComposer::compose`]: resilient, falls back to [`fallback_answer`].

mod prompt;
mod summary;
mod template;

use std::{sync::Arc, time::Duration};

use ai_llm_service::{GenerationRequest, Profile, TextGeneration};
use ocean_model::{DataSource, KnowledgeSnippet, Query, Record};
use tracing::{debug, instrument, warn};

use crate::error::CompositionFailure;

pub use prompt::{build_user_prompt, system_prompt};
pub use summary::{RecordSummary, Stats};
pub use template::fallback_answer;

/// Answer text plus the reason it came from the template, if it did.
#[derive(Debug, Clone)]
pub struct Composition {
    pub text: String,
    pub warning: Option<String>,
}

pub struct ResponseComposer {
    llm: Arc<dyn TextGeneration>,
    timeout: Duration,
    max_ctx_chars: usize,
}

impl ResponseComposer {
    pub fn new(llm: Arc<dyn TextGeneration>, timeout: Duration, max_ctx_chars: usize) -> Self {
        Self {
            llm,
            timeout,
            max_ctx_chars,
        }
    }

    /// One generation call on the slow profile, bounded by the composer timeout.
    ///
    /// # Errors
    /// [`CompositionFailure`] on generation error, timeout or blank output.
    pub async fn try_compose(
        &self,
        query: &Query,
        records: &[Record],
        source: Option<DataSource>,
        snippets: &[KnowledgeSnippet],
    ) -> Result<String, CompositionFailure> {
        let summary = RecordSummary::new(query.variable_or_default(), records, source);
        let system = system_prompt(query.user_role);
        let user = build_user_prompt(query, &summary, snippets, self.max_ctx_chars);
        let req = GenerationRequest::text(Profile::Slow, Some(&system), &user);

        let text = tokio::time::timeout(self.timeout, self.llm.generate_text(req))
            .await
            .map_err(|_| CompositionFailure::Timeout(self.timeout))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(CompositionFailure::Empty);
        }
        Ok(text.to_string())
    }

    /// Never fails and never returns empty text.
    #[instrument(skip_all, fields(records = records.len(), snippets = snippets.len()))]
    pub async fn compose(
        &self,
        query: &Query,
        records: &[Record],
        source: Option<DataSource>,
        snippets: &[KnowledgeSnippet],
    ) -> Composition {
        match self.try_compose(query, records, source, snippets).await {
            Ok(text) => {
                debug!(chars = text.len(), "answer generated");
                Composition {
                    text,
                    warning: None,
                }
            }
            Err(err) => {
                warn!(error = %err, "answer generation degraded; using template");
                Composition {
                    text: self.fallback(query, records, source),
                    warning: Some(format!("Answer written from statistics only: {err}")),
                }
            }
        }
    }

    pub fn fallback(&self, query: &Query, records: &[Record], source: Option<DataSource>) -> String {
        let summary = RecordSummary::new(query.variable_or_default(), records, source);
        fallback_answer(query, &summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::AiLlmError;
    use chrono::{TimeZone, Utc};
    use futures::future::BoxFuture;
    use ocean_model::{Observation, QcFlag, UserRole, Variable};

    struct Fixed(Option<&'static str>, Duration);

    impl TextGeneration for Fixed {
        fn generate_text<'a>(
            &'a self,
            request: GenerationRequest<'a>,
        ) -> BoxFuture<'a, Result<String, AiLlmError>> {
            assert_eq!(request.profile, Profile::Slow);
            Box::pin(async move {
                tokio::time::sleep(self.1).await;
                self.0
                    .map(str::to_string)
                    .ok_or(AiLlmError::Timeout(Duration::from_secs(30)))
            })
        }
    }

    fn records() -> Vec<Record> {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        vec![
            Observation::new("1", 15.0, 88.0, t, 500.0, QcFlag::Good)
                .unwrap()
                .with_value(Variable::Temperature, 9.5)
                .stamp(DataSource::Synthetic, t),
        ]
    }

    fn composer(reply: Option<&'static str>, delay: Duration) -> ResponseComposer {
        ResponseComposer::new(Arc::new(Fixed(reply, delay)), Duration::from_secs(20), 2_000)
    }

    #[tokio::test]
    async fn generated_text_is_trimmed() {
        let c = composer(Some("  Warm water.  \n"), Duration::ZERO);
        let q = Query::new("q", UserRole::Student);
        let out = c.compose(&q, &records(), Some(DataSource::Synthetic), &[]).await;
        assert_eq!(out.text, "Warm water.");
        assert!(out.warning.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_falls_back_to_statistics() {
        let c = composer(Some("late"), Duration::from_secs(60));
        let q = Query::new("q", UserRole::Researcher);
        let out = c.compose(&q, &records(), Some(DataSource::Synthetic), &[]).await;
        assert!(out.text.contains("9.50"));
        assert!(out.warning.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn blank_and_failed_generation_fall_back() {
        let q = Query::new("q", UserRole::Policymaker);
        for c in [composer(Some("   "), Duration::ZERO), composer(None, Duration::ZERO)] {
            let out = c.compose(&q, &[], None, &[]).await;
            assert!(!out.text.is_empty());
            assert!(out.warning.is_some());
        }
    }
}
