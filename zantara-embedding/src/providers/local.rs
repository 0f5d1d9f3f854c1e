//! Local sentence-transformer provider (384-dim multilingual), served by a
//! sidecar inference process over HTTP — mirrors the raw-HTTP-JSON pattern
//! `data/src/services/qdrant_client.rs` uses for its own backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zantara_errors::CoreError;

use super::EmbeddingProvider;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct LocalSentenceTransformerProvider {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl LocalSentenceTransformerProvider {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for LocalSentenceTransformerProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        let url = format!("{}/embed", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&EmbedRequest { texts })
            .send()
            .await
            .map_err(|e| CoreError::EmbeddingUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CoreError::EmbeddingUnavailable(format!(
                "local embedder returned {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| CoreError::EmbeddingUnavailable(e.to_string()))?;
        Ok(parsed.embeddings)
    }

    fn name(&self) -> &'static str {
        "local-sentence-transformer"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensionality(&self) -> usize {
        384
    }

    fn batch_limit(&self) -> usize {
        32
    }
}
