//! End-to-end Answer Orchestrator tests against live services, ignore-gated
//! and env-configured. Requires a running Postgres (with the schema
//! applied), Redis, Qdrant, and an OpenAI-compatible endpoint — none of
//! these are started by `cargo test` itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use zantara_embedding::providers::hosted::HostedApiProvider;
use zantara_embedding::EmbeddingClient;
use zantara_errors::CoreError;
use zantara_golden::GoldenCache;
use zantara_llm::providers::openai_compatible::OpenAiCompatibleProvider;
use zantara_llm::{FallbackLadder, LlmClient, ToolExecutor, ToolResultBlock, ToolUseBlock};
use zantara_memory::session::SessionStore;
use zantara_memory::{UserProfile, UserProfileProvider};
use zantara_models::TierPolicy;
use zantara_orchestrator::{AnswerOrchestrator, FactExtractor, ProcessOptions};
use zantara_store::RelationalStoreGateway;
use zantara_vector_store::VectorStoreGateway;

struct NoopToolExecutor;

#[async_trait]
impl ToolExecutor for NoopToolExecutor {
    async fn execute(&self, call: &ToolUseBlock) -> ToolResultBlock {
        ToolResultBlock { tool_use_id: call.id.clone(), content: "no tools configured".into(), is_error: true }
    }
}

struct AnonymousProfileProvider;

#[async_trait]
impl UserProfileProvider for AnonymousProfileProvider {
    async fn fetch(&self, user_id: Uuid) -> Result<Option<UserProfile>, CoreError> {
        Ok(Some(UserProfile { id: user_id, role: "client".into(), preferred_language: "en".into() }))
    }
}

struct NoFactExtractor;

#[async_trait]
impl FactExtractor for NoFactExtractor {
    async fn extract(&self, _turn_text: &str) -> Result<Vec<String>, CoreError> {
        Ok(Vec::new())
    }
}

async fn build_orchestrator() -> AnswerOrchestrator {
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost:5432/zantara_test".into());
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into());
    let qdrant_url = std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6333".into());
    let llm_api_key = std::env::var("LLM_EXTERNAL_API_KEY").ok();

    let store = RelationalStoreGateway::connect(&database_url).await.expect("connect to postgres");
    let vector_store = VectorStoreGateway::new(qdrant_url, None);
    let session_store = SessionStore::new(&redis_url).await;

    let embedding = Arc::new(EmbeddingClient::new(Box::new(HostedApiProvider::new(llm_api_key.clone(), "text-embedding-3-small"))));

    let golden = GoldenCache::new(store.clone(), embedding.clone());
    golden.initialize().await.expect("load golden routes");

    let primary = OpenAiCompatibleProvider::new(llm_api_key.clone(), None, "gpt-4o-mini");
    let ladder = FallbackLadder::new(vec![Box::new(primary)]);
    let llm = LlmClient::new(ladder);

    AnswerOrchestrator::new(
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
        Some(Arc::new(NoFactExtractor)),
        Duration::from_secs(20),
    )
}

/// Seeds a golden exact-match cluster directly via SQL: there is no public
/// "insert golden answer" operation, since seeding curated answers is an
/// offline admin task.
async fn seed_golden_answer(store: &RelationalStoreGateway, question: &str, answer_text: &str) -> String {
    let cluster_id = Uuid::new_v4().to_string();
    let hash = zantara_golden::exact_hash(question);

    sqlx::query("INSERT INTO query_clusters (cluster_id, query_hash, query_text, frequency) VALUES ($1, $2, $3, 1)")
        .bind(&cluster_id)
        .bind(&hash)
        .bind(question)
        .execute(store.pool())
        .await
        .expect("seed query_clusters");

    sqlx::query(
        "INSERT INTO golden_answers (cluster_id, canonical_question, answer, sources, confidence, usage_count)
         VALUES ($1, $2, $3, '{}', 1.0, 0)",
    )
    .bind(&cluster_id)
    .bind(question)
    .bind(answer_text)
    .execute(store.pool())
    .await
    .expect("seed golden_answers");

    cluster_id
}

#[tokio::test]
#[ignore] // requires live postgres/redis/qdrant/LLM
async fn golden_exact_hit_short_circuits_the_pipeline() {
    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost:5432/zantara_test".into());
    let seed_store = RelationalStoreGateway::connect(&database_url).await.expect("connect to postgres");

    let orchestrator = build_orchestrator().await;
    let question = format!("what are bali zero's office hours {}", Uuid::new_v4());
    seed_golden_answer(&seed_store, &question, "We're open Monday to Friday, 9am to 5pm WITA.").await;

    let response = orchestrator.process_query(&question, Uuid::new_v4(), None, &ProcessOptions::default()).await;

    assert_eq!(response.answer, "We're open Monday to Friday, 9am to 5pm WITA.");
    assert_eq!(response.model_used, "golden_cache");
}

#[tokio::test]
#[ignore] // requires live postgres/redis/qdrant/LLM
async fn business_query_runs_full_pipeline_and_returns_grounded_sources() {
    let orchestrator = build_orchestrator().await;
    let response = orchestrator
        .process_query("What are the requirements for a KITAS work permit?", Uuid::new_v4(), None, &ProcessOptions::default())
        .await;

    assert!(!response.answer.is_empty());
    assert_eq!(response.mode, "legal_deep");
}

#[tokio::test]
#[ignore] // requires live postgres/redis/qdrant; LLM may be slow enough to trip the deadline
async fn exhausted_deadline_skips_persisting_the_turn() {
    let orchestrator = build_orchestrator().await;
    let session_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let response = orchestrator
        .process_query("Tell me everything about Indonesian tax law for foreign investors.", user_id, Some(session_id), &ProcessOptions::default())
        .await;

    // Whether or not the deadline actually tripped, the call must never
    // propagate a panic or hang past the configured deadline plus slack.
    assert_eq!(response.session_id, session_id);
}
