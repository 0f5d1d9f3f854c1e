//! Answer Orchestrator: ties classification → golden check → memory fetch
//! → retrieval → LLM call with tool loop → post-processing → persistence
//! into one `process_query` entry point. Library-only, like
//! `zantara-ingest`'s orchestrator: no HTTP transport lives here — a
//! caller wires this crate behind whatever transport it likes.

mod locks;

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

use zantara_errors::CoreError;
use zantara_golden::{GoldenCache, GoldenCheck};
use zantara_llm::{ChatMessage, LlmClient, ToolExecutor, ToolSpec};
use zantara_memory::{MemoryAssembler, SessionStore, UserProfileProvider};
use zantara_models::wire::{QueryResponse, ResponseFormat, SourceRef};
use zantara_models::{QueryAnalyticsRecord, TierPolicy, UserMemory};
use zantara_retrieval::{RetrievalEngine, RetrievalOptions};
use zantara_router::{classify, route};
use zantara_store::RelationalStoreGateway;
use zantara_vector_store::VectorStoreGateway;

use locks::UserLockTable;

/// Bounded, somewhat-LRU map of per-user persistence mutexes: serializes
/// writes to session history and memory per user id via a per-key mutex.
const MAX_TRACKED_USER_LOCKS: usize = 4096;

/// Extracts durable facts from a finished turn via a cheap LLM call. Kept
/// narrow like `zantara_ingest::HydeQuestionGenerator` so callers can wire
/// in whatever tier they like, or `None` to disable.
#[async_trait]
pub trait FactExtractor: Send + Sync {
    async fn extract(&self, turn_text: &str) -> Result<Vec<String>, CoreError>;
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub user_level: u8,
    pub response_format: ResponseFormat,
    pub collection_override: Option<String>,
    pub language_override: Option<String>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self { user_level: 1, response_format: ResponseFormat::Conversational, collection_override: None, language_override: None }
    }
}

pub struct AnswerOrchestrator {
    embedding: Arc<zantara_embedding::EmbeddingClient>,
    vector_store: VectorStoreGateway,
    store: RelationalStoreGateway,
    tier_policy: TierPolicy,
    golden: GoldenCache,
    llm: LlmClient,
    session_store: SessionStore,
    profile_provider: Arc<dyn UserProfileProvider>,
    tool_executor: Arc<dyn ToolExecutor>,
    tools: Vec<ToolSpec>,
    fact_extractor: Option<Arc<dyn FactExtractor>>,
    request_deadline: Duration,
    user_locks: UserLockTable,
}

impl AnswerOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        embedding: Arc<zantara_embedding::EmbeddingClient>,
        vector_store: VectorStoreGateway,
        store: RelationalStoreGateway,
        tier_policy: TierPolicy,
        golden: GoldenCache,
        llm: LlmClient,
        session_store: SessionStore,
        profile_provider: Arc<dyn UserProfileProvider>,
        tool_executor: Arc<dyn ToolExecutor>,
        tools: Vec<ToolSpec>,
        fact_extractor: Option<Arc<dyn FactExtractor>>,
        request_deadline: Duration,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            store,
            tier_policy,
            golden,
            llm,
            session_store,
            profile_provider,
            tool_executor,
            tools,
            fact_extractor,
            request_deadline,
            user_locks: UserLockTable::new(MAX_TRACKED_USER_LOCKS),
        }
    }

    /// The single entry point. Never propagates an error to the caller:
    /// every internal failure degrades to a best-effort or
    /// localized-fallback response.
    pub async fn process_query(
        &self,
        message: &str,
        user_id: Uuid,
        session_id: Option<Uuid>,
        options: &ProcessOptions,
    ) -> QueryResponse {
        let start = Instant::now();
        let session_id = session_id.unwrap_or_else(Uuid::new_v4);
        let language = options.language_override.as_deref().unwrap_or("en");
        let cancel = CancellationToken::new();

        let deadline_cancel = cancel.clone();
        let deadline_guard = tokio::spawn({
            let deadline = self.request_deadline;
            async move {
                tokio::time::sleep(deadline).await;
                deadline_cancel.cancel();
            }
        });

        let mut degraded = Vec::new();
        let result = self
            .run(message, user_id, session_id, options, &cancel, &mut degraded)
            .await;
        deadline_guard.abort();

        let (answer, model_used, sources, conflicts, mode) = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "process_query failed terminally, returning localized fallback");
                (CoreError::localized_fallback(language).to_string(), "fallback".to_string(), Vec::new(), Vec::new(), "fallback".to_string())
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;

        if !cancel.is_cancelled() {
            self.persist_turn(user_id, session_id, message, &answer, &degraded).await;
        }

        self.record_analytics(session_id, user_id, message, &mode, &model_used, latency_ms, &degraded).await;

        QueryResponse { answer, model_used, sources, conflicts, mode, latency_ms, session_id }
    }

    #[allow(clippy::type_complexity)]
    async fn run(
        &self,
        message: &str,
        user_id: Uuid,
        session_id: Uuid,
        options: &ProcessOptions,
        cancel: &CancellationToken,
        degraded: &mut Vec<String>,
    ) -> Result<(String, String, Vec<SourceRef>, Vec<String>, String), CoreError> {
        // 1. Classify.
        let classification = classify(message);

        // 2. Golden check.
        let embedding = self.embedding.clone();
        let message_owned = message.to_string();
        let golden_check = self
            .golden
            .check(message, async move { embedding.embed_query(&message_owned).await })
            .await
            .unwrap_or(GoldenCheck::Miss);

        let forced_collections = match golden_check {
            GoldenCheck::AnswerHit(answer) => {
                let sources = answer
                    .sources
                    .iter()
                    .map(|s| SourceRef { doc_id: s.clone(), title: s.clone(), chunk_index: 0, score: answer.confidence })
                    .collect();
                return Ok((answer.answer_text, "golden_cache".to_string(), sources, Vec::new(), "golden".to_string()));
            }
            GoldenCheck::RouteHit { route, .. } => Some(route.target_collections),
            GoldenCheck::Miss => None,
        };

        // 3. Memory fetch.
        let memory_assembler = MemoryAssembler::new(&self.store, self.profile_provider.as_ref(), &self.session_store);
        let needs_query_enrichment = is_business(classification.category);
        let memory_context = memory_assembler
            .assemble(user_id, needs_query_enrichment.then_some(message), Some(session_id))
            .await;

        // 4. Retrieval, unless this is small talk with nothing to ground.
        let mut routing = route(message, &classification, options.collection_override.as_deref());
        if let Some(collections) = forced_collections {
            routing.collections = collections;
        }

        let (passages, conflicts) = if needs_query_enrichment {
            let retrieval = RetrievalEngine::new(&self.embedding, &self.vector_store, &self.tier_policy);
            let retrieval_options = RetrievalOptions { user_level: options.user_level, ..RetrievalOptions::default() };
            match retrieval.retrieve(message, &routing, &retrieval_options).await {
                Ok(outcome) => (outcome.results, outcome.conflicts_detected.into_iter().map(|c| c.description).collect()),
                Err(e) if e.is_degradable() => {
                    warn!(error = %e, "retrieval degraded, proceeding with empty passages");
                    degraded.push("retrieval".to_string());
                    (Vec::new(), Vec::new())
                }
                Err(e) => return Err(e),
            }
        } else {
            (Vec::new(), Vec::new())
        };

        // 5. System prompt assembly.
        let system_prompt = build_system_prompt(&classification, &memory_context, &passages);

        // 6. LLM call with tool loop.
        let messages = vec![ChatMessage::user(message)];
        let outcome = self
            .llm
            .chat_with_tools(messages, Some(&system_prompt), &self.tools, self.tool_executor.as_ref(), cancel)
            .await?;

        // 7. Post-processing.
        let answer = clean_response(&outcome.text);

        let sources = passages
            .iter()
            .map(|p| SourceRef {
                doc_id: p.parent_id.clone(),
                title: p.parent_id.clone(),
                chunk_index: p.chunk_index as i32,
                score: p.score,
            })
            .collect();

        Ok((answer, outcome.model_used, sources, conflicts, classification.mode.as_str().to_string()))
    }

    async fn persist_turn(&self, user_id: Uuid, session_id: Uuid, query: &str, answer: &str, degraded: &[String]) {
        let lock = self.user_locks.lock_for(user_id);
        let _guard = lock.lock().await;

        self.session_store.append_message(session_id, "user", query).await;
        self.session_store.append_message(session_id, "assistant", answer).await;

        if degraded.is_empty() {
            if let Some(extractor) = &self.fact_extractor {
                let turn_text = format!("Q: {query}\nA: {answer}");
                match extractor.extract(&turn_text).await {
                    Ok(facts) if !facts.is_empty() => self.upsert_facts(user_id, facts).await,
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "fact extraction failed, continuing without it"),
                }
            }
        }
    }

    async fn upsert_facts(&self, user_id: Uuid, facts: Vec<String>) {
        let mut memory = match self.store.find_user_memory(user_id).await {
            Ok(Some(m)) => m,
            Ok(None) => UserMemory::empty(user_id),
            Err(e) => {
                warn!(error = %e, "could not load user memory for fact upsert");
                return;
            }
        };
        for fact in facts {
            memory.add_fact(fact);
        }
        memory.updated_at = chrono::Utc::now();
        if let Err(e) = self.store.upsert_user_memory(&memory).await {
            warn!(error = %e, "failed to persist extracted facts");
        }
    }

    async fn record_analytics(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        query: &str,
        mode: &str,
        model_used: &str,
        latency_ms: u64,
        degraded: &[String],
    ) {
        let record = QueryAnalyticsRecord {
            session_id,
            user_id: Some(user_id),
            query: query.to_string(),
            mode: mode.to_string(),
            model_used: model_used.to_string(),
            latency_ms,
            degraded_subsystems: degraded.to_vec(),
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = self.store.insert_query_analytics(&record).await {
            warn!(error = %e, "failed to record query analytics");
        }
    }
}

fn is_business(category: zantara_router::IntentCategory) -> bool {
    use zantara_router::IntentCategory::*;
    matches!(category, BusinessSimple | BusinessComplex | BusinessStrategic | DevCode | TeamQuery | Identity)
}

fn build_system_prompt(
    classification: &zantara_router::Classification,
    memory: &zantara_memory::MemoryContext,
    passages: &[zantara_retrieval::RetrievedPassage],
) -> String {
    let mut sections = vec![format!(
        "You are Zantara, a legal/tax/visa/business-setup assistant for Indonesia. Mode: {}.",
        classification.mode.as_str()
    )];

    let memory_section = memory.to_system_prompt();
    if !memory_section.is_empty() {
        sections.push(memory_section);
    }

    if !passages.is_empty() {
        let numbered = passages
            .iter()
            .enumerate()
            .map(|(i, p)| format!("[{}] (source: {}#{})\n{}", i + 1, p.parent_id, p.chunk_index, p.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        sections.push(format!("## Retrieved Passages\n{numbered}"));
    }

    sections.join("\n\n")
}

/// Trim and collapse consecutive blank lines.
fn clean_response(text: &str) -> String {
    let mut out = String::new();
    let mut blank_run = false;
    for line in text.trim().lines() {
        if line.trim().is_empty() {
            if blank_run {
                continue;
            }
            blank_run = true;
        } else {
            blank_run = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_response_collapses_blank_runs() {
        let input = "Line one.\n\n\n\nLine two.\n   \nLine three.";
        assert_eq!(clean_response(input), "Line one.\nLine two.\nLine three.");
    }

    #[test]
    fn clean_response_trims_surrounding_whitespace() {
        assert_eq!(clean_response("  \n  hello  \n\n"), "hello");
    }

    #[test]
    fn business_categories_are_flagged_for_enrichment() {
        assert!(is_business(zantara_router::IntentCategory::BusinessComplex));
        assert!(!is_business(zantara_router::IntentCategory::Greeting));
    }
}
