pub mod hosted;
pub mod local;

use async_trait::async_trait;
use zantara_errors::CoreError;

/// A single embedding backend. `dimensionality()` is fixed at construction
/// time — switching it requires standing up a new collection.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CoreError>;
    fn name(&self) -> &'static str;
    fn model(&self) -> &str;
    fn dimensionality(&self) -> usize;
    /// Provider-specific max batch size per call.
    fn batch_limit(&self) -> usize;
}
