//! End-to-end orchestrator scenarios with in-process capabilities.
//!
//! The generator, embedder, index and providers are test doubles, so every
//! scenario is deterministic and offline.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ai_llm_service::{AiLlmError, GenerationRequest, TextGeneration, error_handler::ConfigError};
use chrono::{TimeZone, Utc};
use float_sources::{DataProvider, DataSourceChain, MockProvider, ProviderFailure, SyntheticProvider};
use futures::future::BoxFuture;
use knowledge_store::{
    DocPayload, EmbeddingsProvider, IndexHit, IndexedDoc, KnowledgeConfig, KnowledgeRetriever,
    MemoryIndex, RagError, VectorIndex,
};
use ocean_model::{
    DataSource, Intent, NamedSea, Observation, Query, Region, RequestStatus, UserRole, Variable,
    VizKind,
};
use query_pipeline::{Orchestrator, OrchestratorError, PipelineConfig};

// ============================================================================
// Test doubles
// ============================================================================

const BOB_500: &str = r#"{"region_name":"Bay of Bengal","bbox":null,"variable":"temperature",
  "depth_min":500,"depth_max":500,"time_start":null,"time_end":null,"intent":"lookup"}"#;

#[derive(Clone, Copy)]
enum Answer {
    Text(&'static str),
    Hang,
}

/// Structured requests get `extraction`, prose requests get `answer`.
struct ScriptedLlm {
    extraction: Result<&'static str, fn() -> AiLlmError>,
    answer: Answer,
}

impl ScriptedLlm {
    fn new(extraction: &'static str, answer: Answer) -> Arc<Self> {
        Arc::new(Self {
            extraction: Ok(extraction),
            answer,
        })
    }
}

impl TextGeneration for ScriptedLlm {
    fn generate_text<'a>(
        &'a self,
        request: GenerationRequest<'a>,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(async move {
            if request.schema_hint.is_some() {
                return self.extraction.map(str::to_string).map_err(|make| make());
            }
            match self.answer {
                Answer::Text(t) => Ok(t.to_string()),
                Answer::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        })
    }
}

struct FixedEmbedder;

impl EmbeddingsProvider for FixedEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, RagError>> {
        Box::pin(async { Ok(vec![1.0, 0.0]) })
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

struct FailingProvider(DataSource);

impl DataProvider for FailingProvider {
    fn source(&self) -> DataSource {
        self.0
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }
    fn fetch<'a>(
        &'a self,
        _query: &'a Query,
    ) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>> {
        Box::pin(async { Err(ProviderFailure::Transport("connection reset".into())) })
    }
}

/// Answers instantly with no observations.
struct EmptyProvider;

impl DataProvider for EmptyProvider {
    fn source(&self) -> DataSource {
        DataSource::Live
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs(1)
    }
    fn fetch<'a>(
        &'a self,
        _query: &'a Query,
    ) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

/// Never answers within its own generous budget.
struct StalledProvider;

impl DataProvider for StalledProvider {
    fn source(&self) -> DataSource {
        DataSource::Live
    }
    fn timeout(&self) -> Duration {
        Duration::from_secs(60)
    }
    fn fetch<'a>(
        &'a self,
        _query: &'a Query,
    ) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>> {
        Box::pin(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        })
    }
}

/// Counts fetches before delegating.
struct Counting<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P: DataProvider> DataProvider for Counting<P> {
    fn source(&self) -> DataSource {
        self.inner.source()
    }
    fn timeout(&self) -> Duration {
        self.inner.timeout()
    }
    fn fetch<'a>(
        &'a self,
        query: &'a Query,
    ) -> BoxFuture<'a, Result<Vec<Observation>, ProviderFailure>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(query)
    }
}

// ============================================================================
// Wiring
// ============================================================================

fn anchor() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

async fn knowledge() -> Arc<KnowledgeRetriever> {
    let index = Arc::new(MemoryIndex::new());
    index
        .upsert(vec![IndexedDoc {
            id: "bob".into(),
            vector: vec![1.0, 0.0],
            payload: DocPayload {
                source_id: "bay-of-bengal".into(),
                title: "Bay of Bengal".into(),
                text: "Heavy river runoff freshens the Bay of Bengal surface layer.".into(),
            },
        }])
        .await
        .unwrap();
    Arc::new(KnowledgeRetriever::new(
        Arc::new(FixedEmbedder),
        index,
        &KnowledgeConfig::default(),
    ))
}

fn standard_chain() -> Arc<DataSourceChain> {
    Arc::new(DataSourceChain::new(vec![
        Arc::new(FailingProvider(DataSource::Live)),
        Arc::new(SyntheticProvider::new(anchor())),
        Arc::new(MockProvider::new()),
    ]))
}

fn cfg() -> PipelineConfig {
    PipelineConfig {
        cache_enabled: false,
        ..PipelineConfig::default()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn bay_of_bengal_at_500m() {
    let llm = ScriptedLlm::new(BOB_500, Answer::Text("Water at 500 m is cool."));
    let orch = Orchestrator::new(llm, knowledge().await, standard_chain(), cfg());

    let env = orch
        .handle_question("Show me temperature in Bay of Bengal at 500m", UserRole::Student)
        .await
        .unwrap();

    assert_eq!(env.status, RequestStatus::Done);
    assert_eq!(env.query.region, Some(Region::Named(NamedSea::BayOfBengal)));
    assert_eq!(env.query.variable, Some(Variable::Temperature));
    let d = env.query.depth_range.unwrap();
    assert_eq!((d.min(), d.max()), (500.0, 500.0));

    assert!(!env.records.is_empty());
    for r in &env.records {
        assert_eq!(r.depth(), 500.0);
        assert_eq!(r.source(), DataSource::Synthetic);
        let t = r.value(Variable::Temperature).unwrap();
        assert!((2.0..=15.0).contains(&t), "temperature {t} at 500 m");
    }
    assert!(matches!(env.visualization.kind(), VizKind::Map | VizKind::Table));
    assert_eq!(env.provenance.source, Some(DataSource::Synthetic));
    assert_eq!(env.provenance.record_count, env.records.len());
    assert_eq!(env.answer_text, "Water at 500 m is cool.");
    assert_eq!(env.context.len(), 1);
    assert!(env.warnings.iter().any(|w| w.starts_with("live data unavailable")));
    assert!(env.export_csv.is_none());
}

#[tokio::test]
async fn every_provider_failing_yields_failed_envelope() {
    let chain = Arc::new(DataSourceChain::new(vec![
        Arc::new(FailingProvider(DataSource::Live)),
        Arc::new(FailingProvider(DataSource::Synthetic)),
        Arc::new(FailingProvider(DataSource::Mock)),
    ]));
    let llm = ScriptedLlm::new(BOB_500, Answer::Text("unused"));
    let orch = Orchestrator::new(llm, knowledge().await, chain, cfg());

    let env = orch.handle_question("temperature in the bay of bengal", UserRole::Researcher).await.unwrap();

    assert_eq!(env.status, RequestStatus::Failed);
    assert!(env.records.is_empty());
    assert_eq!(env.visualization.kind(), VizKind::Table);
    assert!(!env.warnings.is_empty());
    assert!(env.warnings[0].contains("live"));
    assert!(!env.answer_text.is_empty());
    assert_eq!(env.provenance.source, None);
}

#[tokio::test(start_paused = true)]
async fn compose_timeout_answers_from_statistics() {
    let llm = ScriptedLlm::new(BOB_500, Answer::Hang);
    let orch = Orchestrator::new(llm, knowledge().await, standard_chain(), cfg());

    let env = orch.handle_question("temperature at 500m in the bay of bengal", UserRole::Policymaker).await.unwrap();

    assert_eq!(env.status, RequestStatus::Done);
    assert!(!env.records.is_empty());
    assert!(env.answer_text.contains("temperature"));
    assert!(env.answer_text.contains("500 m"));
    assert!(env.warnings.iter().any(|w| w.contains("timed out")));
}

#[tokio::test(start_paused = true)]
async fn request_deadline_caps_composition() {
    let llm = ScriptedLlm::new(BOB_500, Answer::Hang);
    let config = PipelineConfig {
        request_deadline: Duration::from_secs(5),
        ..cfg()
    };
    let orch = Orchestrator::new(llm, knowledge().await, standard_chain(), config);

    let env = orch.handle_question("temperature", UserRole::Student).await.unwrap();

    assert!(!env.answer_text.is_empty());
    assert!(env.warnings.iter().any(|w| w.contains("request deadline")));
}

#[tokio::test(start_paused = true)]
async fn deadline_during_fetch_skips_generation() {
    let chain = Arc::new(DataSourceChain::new(vec![
        Arc::new(StalledProvider) as Arc<dyn DataProvider>,
        Arc::new(SyntheticProvider::new(anchor())),
    ]));
    let llm = ScriptedLlm::new(BOB_500, Answer::Text("ok"));
    let config = PipelineConfig {
        request_deadline: Duration::from_secs(5),
        ..cfg()
    };
    let orch = Orchestrator::new(llm, knowledge().await, chain, config);

    let env = orch.handle_question("temperature in the bay of bengal", UserRole::Student).await.unwrap();

    assert_eq!(env.status, RequestStatus::Done);
    assert!(env.records.is_empty());
    assert_ne!(env.answer_text, "ok");
    assert!(env.answer_text.contains("No temperature measurements"));
    assert!(env.warnings.iter().any(|w| w.contains("did not finish before the request deadline")));
    assert!(env.warnings.iter().any(|w| w.contains("request deadline reached")));
}

#[tokio::test]
async fn empty_live_answer_to_vague_question_uses_synthetic() {
    let chain = Arc::new(DataSourceChain::new(vec![
        Arc::new(EmptyProvider) as Arc<dyn DataProvider>,
        Arc::new(SyntheticProvider::new(anchor())),
        Arc::new(MockProvider::new()),
    ]));
    let llm = ScriptedLlm::new(r#"{"intent":"lookup"}"#, Answer::Text("ok"));
    let orch = Orchestrator::new(llm, knowledge().await, chain, cfg());

    let env = orch.handle_question("what is the ocean doing lately?", UserRole::Student).await.unwrap();

    assert_eq!(env.status, RequestStatus::Done);
    assert!(!env.records.is_empty());
    assert_eq!(env.provenance.source, Some(DataSource::Synthetic));
    assert!(env.warnings.iter().any(|w| w.starts_with("live data unavailable")));
}

#[tokio::test]
async fn vector_outage_still_answers() {
    let retriever = Arc::new(KnowledgeRetriever::new(
        Arc::new(FixedEmbedder),
        Arc::new(DownIndex),
        &KnowledgeConfig::default(),
    ));
    let llm = ScriptedLlm::new(BOB_500, Answer::Text("Cool water."));
    let orch = Orchestrator::new(llm, retriever, standard_chain(), cfg());

    let env = orch.handle_question("temperature at 500m", UserRole::Student).await.unwrap();

    assert_eq!(env.status, RequestStatus::Done);
    assert!(!env.records.is_empty());
    assert!(env.context.is_empty());
    assert_eq!(env.answer_text, "Cool water.");
    assert!(env.warnings.iter().any(|w| w.contains("connection refused")));
}

#[tokio::test]
async fn fatal_extraction_error_aborts() {
    let llm = Arc::new(ScriptedLlm {
        extraction: Err(|| ConfigError::MissingVar("OPENAI_API_KEY").into()),
        answer: Answer::Text("unused"),
    });
    let orch = Orchestrator::new(llm, knowledge().await, standard_chain(), cfg());

    let err = orch.handle_question("salinity", UserRole::Student).await.unwrap_err();
    assert!(matches!(err, OrchestratorError::Extraction(_)));
}

#[tokio::test]
async fn export_intent_attaches_csv() {
    let llm = ScriptedLlm::new(
        r#"{"region_name":"Arabian Sea","variable":"salinity","depth_min":10,"intent":"export"}"#,
        Answer::Text("Here is your data."),
    );
    let orch = Orchestrator::new(llm, knowledge().await, standard_chain(), cfg());

    let env = orch.handle_question("download arabian sea salinity", UserRole::Researcher).await.unwrap();

    assert_eq!(env.query.intent, Intent::Export);
    let csv = env.export_csv.unwrap();
    assert!(csv.starts_with("float_id,latitude,longitude,timestamp,depth_m,salinity,qc_flag,source\n"));
    assert_eq!(csv.lines().count(), env.records.len() + 1);
}

#[tokio::test]
async fn cache_skips_second_fetch() {
    let synthetic = Arc::new(Counting {
        inner: SyntheticProvider::new(anchor()),
        calls: AtomicUsize::new(0),
    });
    let chain = Arc::new(DataSourceChain::new(vec![synthetic.clone() as Arc<dyn DataProvider>]));
    let llm = ScriptedLlm::new(BOB_500, Answer::Text("ok"));
    let orch = Orchestrator::new(llm, knowledge().await, chain, PipelineConfig::default());

    let first = orch.handle_question("q", UserRole::Student).await.unwrap();
    let second = orch.handle_question("q", UserRole::Student).await.unwrap();

    assert_eq!(synthetic.calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.records, second.records);
}
