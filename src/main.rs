mod telemetry;

use std::sync::Arc;

use ai_llm_service::{LlmServiceProfiles, config::default_config::profiles_from_env};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use float_sources::FloatSourcesConfig;
use knowledge_store::{
    KnowledgeConfig, KnowledgeRetriever, LlmEmbedder, corpus::seed_if_empty, open_index,
};
use ocean_model::UserRole;
use query_pipeline::{Orchestrator, PipelineConfig};
use tracing::{info, warn};

/// Ask questions about Argo float data in natural language.
#[derive(Parser, Debug)]
#[command(name = "floatchat", version, about)]
struct Cli {
    /// Debug logs for the workspace crates (RUST_LOG still wins when set).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer one question and print the response envelope as JSON.
    Ask {
        question: String,
        /// student, researcher or policymaker
        #[arg(long, default_value = "student")]
        role: UserRole,
        #[arg(long)]
        pretty: bool,
    },
    /// Probe the configured LLM profiles.
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let profiles = profiles_from_env().context("LLM configuration")?;
    let llm = Arc::new(
        LlmServiceProfiles::new(profiles.fast, profiles.slow, profiles.embedding, None)
            .context("LLM service")?,
    );

    match cli.command {
        Command::Health => {
            let statuses = llm.health_all().await;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
            if statuses.iter().any(|s| !s.ok) {
                anyhow::bail!("at least one LLM profile is unhealthy");
            }
        }
        Command::Ask {
            question,
            role,
            pretty,
        } => {
            let orchestrator = build_orchestrator(llm).await?;
            let envelope = orchestrator.handle_question(&question, role).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&envelope)?
            } else {
                serde_json::to_string(&envelope)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

async fn build_orchestrator(llm: Arc<LlmServiceProfiles>) -> Result<Orchestrator> {
    let kcfg = KnowledgeConfig::from_env();
    let index = open_index(&kcfg).await.context("knowledge index")?;
    let embedder = Arc::new(LlmEmbedder::new(llm.clone(), kcfg.embedding_dim));
    match seed_if_empty(index.as_ref(), embedder.as_ref()).await {
        Ok(n) if n > 0 => info!(documents = n, "knowledge index seeded"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "knowledge seeding failed; answers will lack background"),
    }
    let retriever = Arc::new(KnowledgeRetriever::new(embedder, index, &kcfg));

    let chain = Arc::new(FloatSourcesConfig::from_env().build_chain(Utc::now()));
    info!(sources = ?chain.sources(), "data source chain ready");

    Ok(Orchestrator::new(
        llm,
        retriever,
        chain,
        PipelineConfig::from_env(),
    ))
}
