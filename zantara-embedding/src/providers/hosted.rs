//! Hosted embedding API provider (1536-dim small model), adapted from
//! `embedding/src/services/llm/openai`'s client-wrapping pattern.

use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use zantara_errors::CoreError;

use super::EmbeddingProvider;

pub struct HostedApiProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl HostedApiProvider {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        let config = match api_key {
            Some(key) => OpenAIConfig::new().with_api_key(key),
            None => OpenAIConfig::new(),
        };
        Self {
            client: Client::with_config(config),
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HostedApiProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(texts.to_vec())
            .build()
            .map_err(|e| CoreError::EmbeddingUnavailable(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| CoreError::EmbeddingUnavailable(e.to_string()))?;

        Ok(response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }

    fn name(&self) -> &'static str {
        "hosted-api"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensionality(&self) -> usize {
        1536
    }

    fn batch_limit(&self) -> usize {
        100
    }
}
