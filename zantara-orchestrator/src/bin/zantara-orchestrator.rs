//! One-shot CLI query runner: wires every component from environment
//! config and drives a single question through the pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use zantara_config::AppConfig;
use zantara_embedding::providers::hosted::HostedApiProvider;
use zantara_embedding::providers::local::LocalSentenceTransformerProvider;
use zantara_embedding::EmbeddingClient;
use zantara_errors::CoreError;
use zantara_golden::GoldenCache;
use zantara_llm::providers::openai_compatible::OpenAiCompatibleProvider;
use zantara_llm::{FallbackLadder, LlmClient, ToolExecutor, ToolResultBlock, ToolUseBlock};
use zantara_memory::session::SessionStore;
use zantara_memory::{UserProfile, UserProfileProvider};
use zantara_models::TierPolicy;
use zantara_observability::{info, init_tracing_from_env};
use zantara_orchestrator::{AnswerOrchestrator, ProcessOptions};
use zantara_store::RelationalStoreGateway;
use zantara_vector_store::VectorStoreGateway;

struct NoopToolExecutor;

#[async_trait]
impl ToolExecutor for NoopToolExecutor {
    async fn execute(&self, call: &ToolUseBlock) -> ToolResultBlock {
        ToolResultBlock { tool_use_id: call.id.clone(), content: "no tools wired in the CLI runner".into(), is_error: true }
    }
}

/// No identity/auth layer in the local runner: every query is anonymous.
struct AnonymousProfileProvider;

#[async_trait]
impl UserProfileProvider for AnonymousProfileProvider {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        Ok(Some(UserProfile { id: user_id, role: "anonymous".into(), preferred_language: "en".into() }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing_from_env();
    info!("zantara-orchestrator CLI starting");

    let question: String = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if question.trim().is_empty() {
        eprintln!("usage: zantara-orchestrator <question...>");
        std::process::exit(2);
    }

    let config = AppConfig::from_env();

    let store = RelationalStoreGateway::connect(&config.database_url).await?;
    let vector_store = VectorStoreGateway::new(config.vector_store_url.clone(), config.vector_store_api_key.clone());
    let session_store = SessionStore::new(&config.redis_url).await;

    let embedding = Arc::new(EmbeddingClient::new(build_embedding_provider(&config)));

    let golden = GoldenCache::new(store.clone(), embedding.clone());
    golden.initialize().await?;

    let ladder = FallbackLadder::new(vec![
        Box::new(OpenAiCompatibleProvider::new(config.llm_external_api_key.clone(), None, &config.llm_primary_model)),
        Box::new(OpenAiCompatibleProvider::new(config.llm_external_api_key.clone(), None, &config.llm_secondary_model)),
    ]);
    let llm = LlmClient::new(ladder);

    let orchestrator = AnswerOrchestrator::new(
        embedding,
        vector_store,
        store,
        TierPolicy::default(),
        golden,
        llm,
        session_store,
        Arc::new(AnonymousProfileProvider),
        Arc::new(NoopToolExecutor),
        Vec::new(),
        None,
        Duration::from_secs(config.request_deadline_secs),
    );

    let response = orchestrator.process_query(&question, Uuid::new_v4(), None, &ProcessOptions::default()).await;

    println!("{}", response.answer);
    info!(model = %response.model_used, mode = %response.mode, latency_ms = response.latency_ms, "query answered");

    Ok(())
}

fn build_embedding_provider(config: &AppConfig) -> Box<dyn zantara_embedding::EmbeddingProvider> {
    match config.embedding_provider.as_str() {
        "local" => Box::new(LocalSentenceTransformerProvider::new(
            std::env::var("LOCAL_EMBEDDING_URL").unwrap_or_else(|_| "http://localhost:8000".to_string()),
            "all-MiniLM-L6-v2",
        )),
        _ => Box::new(HostedApiProvider::new(config.embedding_api_key.clone(), "text-embedding-3-small")),
    }
}
