pub mod openai_compatible;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::{ChatMessage, ChatResponse, StreamChunk, ToolSpec};

/// A provider's streamed response: a sequence of text/tool-use chunks.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// Failure classification a [`ChatProvider`] reports back to the fallback
/// ladder. The ladder reacts differently to each: `Quota` advances the tier
/// permanently, `Transient` retries the same tier, `Fatal` is not retried at
/// all.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("quota exhausted: {0}")]
    Quota(String),
    #[error("transient provider error: {0}")]
    Transient(String),
    #[error("fatal provider error: {0}")]
    Fatal(String),
}

/// A single chat backend. One tier of the fallback ladder holds exactly one
/// provider, identified by `model()`.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[ToolSpec],
    ) -> Result<ChatResponse, ProviderError>;

    async fn stream(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[ToolSpec],
    ) -> Result<ChatStream, ProviderError>;

    fn model(&self) -> &str;
}
