//! Orchestrator: runs one question through extraction, data + knowledge
//! fan-out, composition and visualization.

use std::sync::Arc;

use ai_llm_service::TextGeneration;
use float_sources::{ChainOutcome, DataSourceChain};
use knowledge_store::{KnowledgeRetriever, Retrieval};
use ocean_model::{
    Intent, KnowledgeSnippet, Provenance, Query, RequestStatus, ResponseEnvelope, UserRole,
    VisualizationSpec, VizKind,
};
use tokio::time::{Instant, timeout_at};
use tracing::{info, instrument, warn};

use crate::{
    cache::{CacheKey, ResponseCache},
    cfg::PipelineConfig,
    compose::{Composition, ResponseComposer},
    error::Result,
    export::records_to_csv,
    extract::ParameterExtractor,
    state::{RequestState, RequestTracker},
    viz::{VisualizationSelector, build},
};

/// Answer used when no data source produced records.
const UNAVAILABLE_ANSWER: &str =
    "No data source could answer this question right now. Please try again later.";

pub struct Orchestrator {
    extractor: ParameterExtractor,
    retriever: Arc<KnowledgeRetriever>,
    chain: Arc<DataSourceChain>,
    composer: ResponseComposer,
    selector: VisualizationSelector,
    cache: Option<ResponseCache>,
    cfg: PipelineConfig,
}

impl Orchestrator {
    /// Wires the stages from injected capabilities.
    ///
    /// The same generator serves extraction (fast profile) and composition (slow profile).
    pub fn new(
        llm: Arc<dyn TextGeneration>,
        retriever: Arc<KnowledgeRetriever>,
        chain: Arc<DataSourceChain>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            extractor: ParameterExtractor::new(llm.clone(), cfg.extract_timeout),
            composer: ResponseComposer::new(llm, cfg.compose_timeout, cfg.max_ctx_chars),
            selector: VisualizationSelector::new(cfg.viz_drop_warn_ratio),
            cache: cfg
                .cache_enabled
                .then(|| ResponseCache::new(cfg.cache_ttl, cfg.cache_capacity)),
            retriever,
            chain,
            cfg,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Answers one question.
    ///
    /// Data unavailability yields an envelope with `status = failed`; every
    /// other degradation is reported through `warnings`.
    ///
    /// # Errors
    /// [`OrchestratorError::Extraction`](crate::OrchestratorError::Extraction) when
    /// the question cannot be interpreted at all.
    #[instrument(skip_all, fields(role = role.as_str()))]
    pub async fn handle_question(&self, text: &str, role: UserRole) -> Result<ResponseEnvelope> {
        let deadline = Instant::now() + self.cfg.request_deadline;
        let mut tracker = RequestTracker::new();

        tracker.advance(RequestState::Extracting)?;
        let extraction = match self.extractor.extract(text, role).await {
            Ok(e) => e,
            Err(err) => {
                tracker.advance(RequestState::Failed)?;
                return Err(err.into());
            }
        };
        let query = extraction.query;
        let mut warnings = extraction.warnings;

        tracker.advance(RequestState::FetchingAndRetrieving)?;
        let (fetched, retrieved) = tokio::join!(
            timeout_at(deadline, self.fetch(&query)),
            timeout_at(deadline, self.retriever.retrieve(&query.raw_text, self.cfg.context_k)),
        );

        let retrieval = retrieved.unwrap_or_else(|_| {
            warn!("knowledge retrieval cut by request deadline");
            Retrieval {
                snippets: Vec::new(),
                warning: Some("Background knowledge skipped: request deadline reached.".into()),
            }
        });

        let (records, source, chain_warnings) = match fetched {
            Ok(Ok(ChainOutcome {
                records,
                source,
                warnings,
            })) => (records, Some(source), warnings),
            Ok(Err(unavailable)) => {
                warn!(error = %unavailable, "all data sources failed");
                tracker.advance(RequestState::Failed)?;
                warnings.push(unavailable.to_string());
                warnings.extend(retrieval.warning);
                return Ok(self.unavailable(query, retrieval.snippets, warnings));
            }
            Err(_) => {
                warn!("data fetch cut by request deadline");
                (
                    Vec::new(),
                    None,
                    vec!["Data retrieval did not finish before the request deadline.".into()],
                )
            }
        };
        warnings.extend(chain_warnings);
        warnings.extend(retrieval.warning);

        tracker.advance(RequestState::Composing)?;
        let snippets = retrieval.snippets;
        let compose = async {
            let cut = || {
                warn!("answer generation cut by request deadline");
                Composition {
                    text: self.composer.fallback(&query, &records, source),
                    warning: Some(
                        "Answer written from statistics only: request deadline reached.".into(),
                    ),
                }
            };
            if Instant::now() >= deadline {
                return cut();
            }
            timeout_at(
                deadline,
                self.composer.compose(&query, &records, source, &snippets),
            )
            .await
            .unwrap_or_else(|_| cut())
        };
        let visualize = async { self.selector.select(&query, &records) };
        let (composition, selection) = tokio::join!(compose, visualize);

        tracker.advance(RequestState::Visualizing)?;
        warnings.extend(composition.warning);
        warnings.extend(selection.warnings);

        let export_csv = (query.intent == Intent::Export).then(|| records_to_csv(&records));
        tracker.advance(RequestState::Done)?;
        info!(
            records = records.len(),
            source = source.map(|s| s.as_str()).unwrap_or("none"),
            viz = selection.spec.kind().as_str(),
            warnings = warnings.len(),
            "question answered"
        );

        Ok(ResponseEnvelope {
            status: RequestStatus::Done,
            answer_text: composition.text,
            provenance: Provenance::from_records(source, &records),
            query,
            records,
            visualization: selection.spec,
            context: snippets,
            warnings,
            export_csv,
        })
    }

    /// Chain fetch behind the response cache.
    async fn fetch(
        &self,
        query: &Query,
    ) -> std::result::Result<ChainOutcome, float_sources::DataUnavailableError> {
        let Some(cache) = &self.cache else {
            return self.chain.fetch(query).await;
        };
        let key = CacheKey::from_query(query);
        if let Some(hit) = cache.get(&key).await {
            info!(records = hit.records.len(), "cache hit");
            return Ok(hit);
        }
        let outcome = self.chain.fetch(query).await?;
        cache.put(key, outcome.clone()).await;
        Ok(outcome)
    }

    fn unavailable(
        &self,
        query: Query,
        snippets: Vec<KnowledgeSnippet>,
        warnings: Vec<String>,
    ) -> ResponseEnvelope {
        let table = build(VizKind::Table, query.variable_or_default(), &[]);
        ResponseEnvelope {
            status: RequestStatus::Failed,
            answer_text: UNAVAILABLE_ANSWER.into(),
            query,
            records: Vec::new(),
            visualization: VisualizationSpec::new("No data", table.payload),
            provenance: Provenance::from_records(None, &[]),
            context: snippets,
            warnings,
            export_csv: None,
        }
    }
}
