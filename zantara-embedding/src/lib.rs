//! Embedding Client: `embed(texts) → vectors`, `embed_query(text) → vector`.
//! Dimensionality is fixed for the lifetime of the client; caches nothing.

pub mod providers;

use std::time::Duration;

use tracing::warn;
use zantara_errors::CoreError;
use zantara_observability::log_retry;

pub use providers::hosted::HostedApiProvider;
pub use providers::local::LocalSentenceTransformerProvider;
pub use providers::EmbeddingProvider;

const MAX_RETRY_ATTEMPTS: u32 = 4;

pub struct EmbeddingClient {
    provider: Box<dyn EmbeddingProvider>,
}

impl EmbeddingClient {
    pub fn new(provider: Box<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn dimensionality(&self) -> usize {
        self.provider.dimensionality()
    }

    /// Embed a batch of texts, chunking to the provider's batch limit and
    /// retrying with exponential backoff on failure.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.provider.batch_limit()) {
            let embedded = self.embed_with_retry(batch).await?;
            out.extend(embedded);
        }
        Ok(out)
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>, CoreError> {
        let texts = vec![text.to_string()];
        let mut embedded = self.embed_with_retry(&texts).await?;
        embedded
            .pop()
            .ok_or_else(|| CoreError::Internal("embedding provider returned no vector".into()))
    }

    async fn embed_with_retry(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.provider.embed_batch(batch).await {
                Ok(vectors) => return Ok(vectors),
                Err(err) if attempt < MAX_RETRY_ATTEMPTS => {
                    log_retry!("embed_batch", attempt, MAX_RETRY_ATTEMPTS, err);
                    let backoff_ms = 200u64 * 2u64.pow(attempt - 1);
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
                Err(err) => {
                    warn!(attempts = attempt, "embedding provider exhausted retries");
                    return Err(CoreError::EmbeddingUnavailable(err.to_string()));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyProvider {
        fail_times: AtomicU32,
        dim: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyProvider {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError> {
            if self.fail_times.load(Ordering::SeqCst) > 0 {
                self.fail_times.fetch_sub(1, Ordering::SeqCst);
                return Err(CoreError::EmbeddingUnavailable("rate limited".into()));
            }
            Ok(texts.iter().map(|_| vec![0.0; self.dim]).collect())
        }

        fn name(&self) -> &'static str {
            "flaky"
        }

        fn model(&self) -> &str {
            "flaky-model"
        }

        fn dimensionality(&self) -> usize {
            self.dim
        }

        fn batch_limit(&self) -> usize {
            2
        }
    }

    #[tokio::test]
    async fn empty_input_short_circuits() {
        let client = EmbeddingClient::new(Box::new(FlakyProvider {
            fail_times: AtomicU32::new(0),
            dim: 4,
        }));
        let out = client.embed(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let client = EmbeddingClient::new(Box::new(FlakyProvider {
            fail_times: AtomicU32::new(2),
            dim: 4,
        }));
        let out = client.embed_query("hello").await.unwrap();
        assert_eq!(out.len(), 4);
    }

    #[tokio::test]
    async fn exhausts_retries_and_fails() {
        let client = EmbeddingClient::new(Box::new(FlakyProvider {
            fail_times: AtomicU32::new(10),
            dim: 4,
        }));
        let err = client.embed_query("hello").await.unwrap_err();
        assert!(matches!(err, CoreError::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn batches_respect_provider_limit() {
        let client = EmbeddingClient::new(Box::new(FlakyProvider {
            fail_times: AtomicU32::new(0),
            dim: 4,
        }));
        let texts: Vec<String> = (0..5).map(|i| format!("t{i}")).collect();
        let out = client.embed(&texts).await.unwrap();
        assert_eq!(out.len(), 5);
    }
}
