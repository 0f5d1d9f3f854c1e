//! OpenAI-compatible chat provider wrapping `async_openai::Client<OpenAIConfig>`.
//! One instance backs one ladder tier; `base_url` lets the Flash/Flash-Lite
//! tiers and the external tier all speak through the same OpenAI-compatible
//! surface with different endpoints and models.

use std::collections::BTreeMap;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolArgs,
        ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures_util::StreamExt;

use crate::{ChatMessage, ChatResponse, ChatRole, StreamChunk, ToolSpec, ToolUseBlock};

use super::{ChatProvider, ChatStream, ProviderError};

pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: impl Into<String>) -> Self {
        let mut config = match api_key {
            Some(key) => OpenAIConfig::new().with_api_key(key),
            None => OpenAIConfig::new(),
        };
        if let Some(url) = base_url {
            config = config.with_api_base(url);
        }
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }

    fn build_messages(
        messages: &[ChatMessage],
        system: Option<&str>,
    ) -> Result<Vec<ChatCompletionRequestMessage>, ProviderError> {
        let mut out = Vec::with_capacity(messages.len() + 1);

        if let Some(system) = system {
            let msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| ProviderError::Fatal(e.to_string()))?;
            out.push(msg.into());
        }

        for message in messages {
            let converted: ChatCompletionRequestMessage = match message.role {
                ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(|e| ProviderError::Fatal(e.to_string()))?
                    .into(),
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(|e| ProviderError::Fatal(e.to_string()))?
                    .into(),
                ChatRole::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(|e| ProviderError::Fatal(e.to_string()))?
                    .into(),
                ChatRole::Tool => {
                    let tool_call_id = message.tool_call_id.clone().unwrap_or_default();
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(tool_call_id)
                        .content(message.content.as_str())
                        .build()
                        .map_err(|e| ProviderError::Fatal(e.to_string()))?
                        .into()
                }
            };
            out.push(converted);
        }

        Ok(out)
    }

    fn build_tools(tools: &[ToolSpec]) -> Result<Vec<ChatCompletionTool>, ProviderError> {
        tools
            .iter()
            .map(|t| {
                let function = FunctionObjectArgs::default()
                    .name(&t.name)
                    .description(&t.description)
                    .parameters(t.input_schema.clone())
                    .build()
                    .map_err(|e| ProviderError::Fatal(e.to_string()))?;
                ChatCompletionToolArgs::default()
                    .r#type(ChatCompletionToolType::Function)
                    .function(function)
                    .build()
                    .map_err(|e| ProviderError::Fatal(e.to_string()))
            })
            .collect()
    }

    /// Classifies an `async_openai` error as quota exhaustion, transient, or
    /// fatal, based on the wrapped HTTP status / message text (the crate does
    /// not expose a typed status code for API errors).
    fn classify_error(err: async_openai::error::OpenAIError) -> ProviderError {
        let message = err.to_string();
        let lowered = message.to_lowercase();
        if lowered.contains("429") || lowered.contains("quota") || lowered.contains("rate limit") {
            ProviderError::Quota(message)
        } else if lowered.contains("500")
            || lowered.contains("502")
            || lowered.contains("503")
            || lowered.contains("timed out")
            || lowered.contains("connection")
        {
            ProviderError::Transient(message)
        } else {
            ProviderError::Fatal(message)
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatibleProvider {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[ToolSpec],
    ) -> Result<ChatResponse, ProviderError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(Self::build_messages(messages, system)?);

        if !tools.is_empty() {
            builder.tools(Self::build_tools(tools)?);
        }

        let request = builder.build().map_err(|e| ProviderError::Fatal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(Self::classify_error)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Fatal("provider returned no choices".into()))?;

        let text = choice.message.content.unwrap_or_default();
        let tool_uses = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolUseBlock {
                id: call.id,
                name: call.function.name,
                input: serde_json::from_str(&call.function.arguments).unwrap_or(serde_json::Value::Null),
            })
            .collect();

        Ok(ChatResponse {
            text,
            tool_uses,
            model: self.model.clone(),
        })
    }

    /// Streams text deltas as they arrive; tool-call argument fragments are
    /// accumulated by index and surfaced as a single `ToolUse` chunk once the
    /// stream ends, since the wire format splits one call's arguments across
    /// many deltas.
    async fn stream(
        &self,
        messages: &[ChatMessage],
        system: Option<&str>,
        tools: &[ToolSpec],
    ) -> Result<ChatStream, ProviderError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model)
            .messages(Self::build_messages(messages, system)?)
            .stream(true);
        if !tools.is_empty() {
            builder.tools(Self::build_tools(tools)?);
        }
        let request = builder.build().map_err(|e| ProviderError::Fatal(e.to_string()))?;

        let upstream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(Self::classify_error)?;

        let mut pending: BTreeMap<u32, (Option<String>, Option<String>, String)> = BTreeMap::new();

        let mapped = upstream.flat_map(move |chunk| {
            let mut out = Vec::new();
            match chunk {
                Ok(resp) => {
                    if let Some(choice) = resp.choices.into_iter().next() {
                        if let Some(content) = choice.delta.content {
                            if !content.is_empty() {
                                out.push(Ok(StreamChunk::Text(content)));
                            }
                        }
                        for call in choice.delta.tool_calls.unwrap_or_default() {
                            let entry = pending.entry(call.index).or_insert((None, None, String::new()));
                            if let Some(id) = call.id {
                                entry.0 = Some(id);
                            }
                            if let Some(function) = call.function {
                                if let Some(name) = function.name {
                                    entry.1 = Some(name);
                                }
                                if let Some(args) = function.arguments {
                                    entry.2.push_str(&args);
                                }
                            }
                        }
                        if choice.finish_reason.is_some() {
                            for (_, (id, name, args)) in std::mem::take(&mut pending) {
                                let (Some(id), Some(name)) = (id, name) else { continue };
                                let input = serde_json::from_str(&args).unwrap_or(serde_json::Value::Null);
                                out.push(Ok(StreamChunk::ToolUse(ToolUseBlock { id, name, input })));
                            }
                            out.push(Ok(StreamChunk::Done));
                        }
                    }
                }
                Err(e) => out.push(Err(Self::classify_error(e))),
            }
            futures::stream::iter(out)
        });

        Ok(Box::pin(mapped))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
