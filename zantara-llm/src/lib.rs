//! LLM Adapter & Fallback Ladder: a unified `chat`/`stream` surface over N
//! chat providers, with quota-aware tier promotion and a bounded tool-use
//! loop. Shares `zantara-embedding`'s retry/backoff discipline
//! (`MAX_RETRY_ATTEMPTS`, `log_retry!`) but layers a second axis on top:
//! failures can also advance the *tier*, not just retry in place.

pub mod providers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use zantara_errors::CoreError;
use zantara_observability::{log_llm_fallback, log_retry};

pub use providers::{ChatProvider, ChatStream, ProviderError};
pub use providers::openai_compatible::OpenAiCompatibleProvider;

/// Same-tier retry budget before a transient error is treated as exhausted
/// for this tier.
const MAX_TRANSIENT_RETRIES: u32 = 3;
/// Tool-use hop limit.
const DEFAULT_HOP_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Set only on `Tool`-role messages: which tool-use block this result
    /// answers.
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into(), tool_call_id: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into(), tool_call_id: None }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: ChatRole::Tool, content: content.into(), tool_call_id: Some(tool_call_id.into()) }
    }
}

/// A tool the LLM may invoke, described via JSON Schema input parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// A tool invocation surfaced uniformly across providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// The orchestrator's answer to a `ToolUseBlock`, fed back into the next
/// turn as a `Tool`-role message.
#[derive(Debug, Clone)]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    pub content: String,
    pub is_error: bool,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub text: String,
    pub tool_uses: Vec<ToolUseBlock>,
    pub model: String,
}

impl ChatResponse {
    pub fn has_tool_use(&self) -> bool {
        !self.tool_uses.is_empty()
    }
}

#[derive(Debug, Clone)]
pub enum StreamChunk {
    Text(String),
    ToolUse(ToolUseBlock),
    Done,
}

/// Executes a tool call by name. Implemented by the answer orchestrator;
/// this crate only knows the `{id, name, input}` shape.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolUseBlock) -> ToolResultBlock;
}

/// Outcome of a full tool-use loop: the last textual answer plus which
/// model actually produced it.
#[derive(Debug, Clone)]
pub struct LlmOutcome {
    pub text: String,
    pub model_used: String,
    pub hops: u32,
}

/// Ordered chat-provider tiers with quota-aware promotion.
/// `current_tier` only ever moves forward for the process's lifetime.
pub struct FallbackLadder {
    tiers: Vec<Box<dyn ChatProvider>>,
    current_tier: AtomicUsize,
}

impl FallbackLadder {
    pub fn new(tiers: Vec<Box<dyn ChatProvider>>) -> Self {
        Self { tiers, current_tier: AtomicUsize::new(0) }
    }

    pub fn current_tier_index(&self) -> usize {
        self.current_tier.load(Ordering::SeqCst)
    }

    /// One completion, walking the ladder from the current tier onward.
    /// Transient errors retry the same tier up to [`MAX_TRANSIENT_RETRIES`];
    /// quota errors advance the tier permanently and move on immediately;
    /// fatal errors also advance, since there is nothing to retry.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[ToolSpec],
    ) -> Result<ChatResponse, CoreError> {
        let start = self.current_tier_index();

        for tier_index in start..self.tiers.len() {
            let provider = &self.tiers[tier_index];
            let mut attempt = 0u32;

            loop {
                attempt += 1;
                match provider.complete(messages, system, tools).await {
                    Ok(response) => {
                        self.current_tier.fetch_max(tier_index, Ordering::SeqCst);
                        return Ok(response);
                    }
                    Err(ProviderError::Transient(msg)) if attempt < MAX_TRANSIENT_RETRIES => {
                        log_retry!("llm_complete", attempt, MAX_TRANSIENT_RETRIES, msg);
                        let backoff_ms = 200u64 * 2u64.pow(attempt - 1);
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    }
                    Err(ProviderError::Quota(reason)) => {
                        self.advance_tier(tier_index, provider.model(), &reason);
                        break;
                    }
                    Err(ProviderError::Transient(reason)) => {
                        self.advance_tier(tier_index, provider.model(), &reason);
                        break;
                    }
                    Err(ProviderError::Fatal(reason)) => {
                        self.advance_tier(tier_index, provider.model(), &reason);
                        break;
                    }
                }
            }
        }

        Err(CoreError::LLMUnavailable("all fallback tiers exhausted".into()))
    }

    fn advance_tier(&self, from_index: usize, from_model: &str, reason: &str) {
        let next = from_index + 1;
        self.current_tier.fetch_max(next, Ordering::SeqCst);
        let to_model = self.tiers.get(next).map(|p| p.model()).unwrap_or("none");
        log_llm_fallback!(from_model, to_model, reason);
    }

    /// Streams from the current tier only — quota/transient promotion for
    /// streaming calls happens on the *next* `complete`/`stream` call, since
    /// a stream already in flight for this tier has no fallback mid-flight.
    pub async fn stream(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[ToolSpec],
    ) -> Result<ChatStream, CoreError> {
        let tier_index = self.current_tier_index();
        let provider = self
            .tiers
            .get(tier_index)
            .ok_or_else(|| CoreError::LLMUnavailable("no provider at current tier".into()))?;
        provider
            .stream(messages, system, tools)
            .await
            .map_err(|e| CoreError::LLMUnavailable(e.to_string()))
    }
}

/// Drives the tool-use loop on top of a [`FallbackLadder`]: executes each
/// tool call, feeds results back as `Tool`-role messages, and stops once a
/// turn produces no tool use or the hop limit is reached.
pub struct LlmClient {
    ladder: FallbackLadder,
    hop_limit: u32,
}

impl LlmClient {
    pub fn new(ladder: FallbackLadder) -> Self {
        Self { ladder, hop_limit: DEFAULT_HOP_LIMIT }
    }

    pub fn with_hop_limit(mut self, hop_limit: u32) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    /// Runs the tool loop to completion, or until `cancel` fires — in which
    /// case the partial text accumulated so far is returned rather than an
    /// error.
    pub async fn chat_with_tools(
        &self,
        mut messages: Vec<ChatMessage>,
        system: Option<&str>,
        tools: &[ToolSpec],
        executor: &dyn ToolExecutor,
        cancel: &CancellationToken,
    ) -> Result<LlmOutcome, CoreError> {
        let mut last_text = String::new();
        let mut model_used = String::new();

        for hop in 0..self.hop_limit {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(LlmOutcome { text: last_text, model_used, hops: hop });
                }
                result = self.ladder.complete(&messages, system, tools) => result?,
            };

            last_text = response.text.clone();
            model_used = response.model.clone();

            if !response.has_tool_use() {
                return Ok(LlmOutcome { text: last_text, model_used, hops: hop + 1 });
            }

            if !response.text.is_empty() {
                messages.push(ChatMessage::assistant(response.text.clone()));
            }

            for call in &response.tool_uses {
                let result = executor.execute(call).await;
                let content = if result.is_error {
                    format!("error: {}", result.content)
                } else {
                    result.content
                };
                messages.push(ChatMessage::tool_result(result.tool_use_id, content));
            }
        }

        Ok(LlmOutcome { text: last_text, model_used, hops: self.hop_limit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
    use std::sync::Mutex;

    struct ScriptedProvider {
        model: &'static str,
        responses: Mutex<Vec<Result<ChatResponse, ProviderError>>>,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn complete(
            &self,
            _messages: &[ChatMessage],
            _system: Option<&str>,
            _tools: &[ToolSpec],
        ) -> Result<ChatResponse, ProviderError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(ProviderError::Fatal("no scripted responses left".into()));
            }
            responses.remove(0)
        }

        async fn stream(
            &self,
            _messages: &[ChatMessage],
            _system: Option<&str>,
            _tools: &[ToolSpec],
        ) -> Result<ChatStream, ProviderError> {
            unimplemented!("not exercised in these tests")
        }

        fn model(&self) -> &str {
            self.model
        }
    }

    fn ok_response(text: &str) -> Result<ChatResponse, ProviderError> {
        Ok(ChatResponse { text: text.into(), tool_uses: Vec::new(), model: "scripted".into() })
    }

    struct NoopExecutor;

    #[async_trait]
    impl ToolExecutor for NoopExecutor {
        async fn execute(&self, call: &ToolUseBlock) -> ToolResultBlock {
            ToolResultBlock { tool_use_id: call.id.clone(), content: "{}".into(), is_error: false }
        }
    }

    #[tokio::test]
    async fn quota_error_advances_tier_permanently() {
        let flash = ScriptedProvider {
            model: "flash",
            responses: Mutex::new(vec![Err(ProviderError::Quota("exhausted".into()))]),
        };
        let flash_lite = ScriptedProvider {
            model: "flash-lite",
            responses: Mutex::new(vec![ok_response("answer from flash-lite")]),
        };
        let ladder = FallbackLadder::new(vec![Box::new(flash), Box::new(flash_lite)]);

        let response = ladder.complete(&[ChatMessage::user("hi")], None, &[]).await.unwrap();
        assert_eq!(response.text, "answer from flash-lite");
        assert_eq!(ladder.current_tier_index(), 1);
    }

    #[tokio::test]
    async fn transient_error_retries_same_tier_before_advancing() {
        let counter = AtomicU32::new(0);
        struct CountingProvider<'a> {
            count: &'a AtomicU32,
        }
        #[async_trait]
        impl<'a> ChatProvider for CountingProvider<'a> {
            async fn complete(
                &self,
                _messages: &[ChatMessage],
                _system: Option<&str>,
                _tools: &[ToolSpec],
            ) -> Result<ChatResponse, ProviderError> {
                let n = self.count.fetch_add(1, AtomicOrdering::SeqCst);
                if n < 2 {
                    Err(ProviderError::Transient("timeout".into()))
                } else {
                    Ok(ChatResponse { text: "recovered".into(), tool_uses: Vec::new(), model: "flash".into() })
                }
            }
            async fn stream(
                &self,
                _messages: &[ChatMessage],
                _system: Option<&str>,
                _tools: &[ToolSpec],
            ) -> Result<ChatStream, ProviderError> {
                unimplemented!()
            }
            fn model(&self) -> &str {
                "flash"
            }
        }

        let ladder = FallbackLadder::new(vec![Box::new(CountingProvider { count: &counter })]);
        let response = ladder.complete(&[ChatMessage::user("hi")], None, &[]).await.unwrap();
        assert_eq!(response.text, "recovered");
        assert_eq!(ladder.current_tier_index(), 0);
    }

    #[tokio::test]
    async fn all_tiers_exhausted_returns_llm_unavailable() {
        let only = ScriptedProvider {
            model: "flash",
            responses: Mutex::new(vec![Err(ProviderError::Fatal("bad request".into()))]),
        };
        let ladder = FallbackLadder::new(vec![Box::new(only)]);
        let err = ladder.complete(&[ChatMessage::user("hi")], None, &[]).await.unwrap_err();
        assert!(matches!(err, CoreError::LLMUnavailable(_)));
    }

    #[tokio::test]
    async fn tool_loop_stops_when_no_tool_use() {
        let provider = ScriptedProvider {
            model: "flash",
            responses: Mutex::new(vec![ok_response("final answer")]),
        };
        let client = LlmClient::new(FallbackLadder::new(vec![Box::new(provider)]));
        let outcome = client
            .chat_with_tools(vec![ChatMessage::user("hi")], None, &[], &NoopExecutor, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.text, "final answer");
        assert_eq!(outcome.hops, 1);
    }

    #[tokio::test]
    async fn tool_loop_executes_tool_then_returns_final_text() {
        let provider = ScriptedProvider {
            model: "flash",
            responses: Mutex::new(vec![
                Ok(ChatResponse {
                    text: String::new(),
                    tool_uses: vec![ToolUseBlock { id: "call_1".into(), name: "search".into(), input: Value::Null }],
                    model: "flash".into(),
                }),
                ok_response("final answer after tool"),
            ]),
        };
        let client = LlmClient::new(FallbackLadder::new(vec![Box::new(provider)]));
        let outcome = client
            .chat_with_tools(vec![ChatMessage::user("hi")], None, &[], &NoopExecutor, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.text, "final answer after tool");
        assert_eq!(outcome.hops, 2);
    }

    #[tokio::test]
    async fn cancellation_preserves_partial_text() {
        struct StallingProvider;
        #[async_trait]
        impl ChatProvider for StallingProvider {
            async fn complete(
                &self,
                _messages: &[ChatMessage],
                _system: Option<&str>,
                _tools: &[ToolSpec],
            ) -> Result<ChatResponse, ProviderError> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                unreachable!("cancelled before this resolves")
            }
            async fn stream(
                &self,
                _messages: &[ChatMessage],
                _system: Option<&str>,
                _tools: &[ToolSpec],
            ) -> Result<ChatStream, ProviderError> {
                unimplemented!()
            }
            fn model(&self) -> &str {
                "flash"
            }
        }

        let client = LlmClient::new(FallbackLadder::new(vec![Box::new(StallingProvider)]));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = client
            .chat_with_tools(vec![ChatMessage::user("hi")], None, &[], &NoopExecutor, &cancel)
            .await
            .unwrap();
        assert_eq!(outcome.text, "");
        assert_eq!(outcome.hops, 0);
    }
}
