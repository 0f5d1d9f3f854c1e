//! Environment-backed configuration: every field has a sane default, so a
//! missing env var degrades instead of panicking.

use reqwest::Client;

#[derive(Clone)]
pub struct TierPolicyConfig {
    pub default_min_level: u8,
}

impl Default for TierPolicyConfig {
    fn default() -> Self {
        Self { default_min_level: 1 }
    }
}

#[derive(Clone)]
pub struct WorkerPoolConfig {
    pub ingestion_workers: usize,
    pub db_pool_min: u32,
    pub db_pool_max: u32,
    pub db_acquire_timeout_secs: u64,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            ingestion_workers: 4,
            db_pool_min: 1,
            db_pool_max: 10,
            db_acquire_timeout_secs: 5,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub http_client: Client,

    pub database_url: String,
    pub redis_url: String,

    pub vector_store_url: String,
    pub vector_store_api_key: Option<String>,

    pub embedding_provider: String,
    pub embedding_api_key: Option<String>,
    pub embedding_dimensionality: usize,

    /// Ordered fallback ladder: primary, secondary, external.
    pub llm_primary_model: String,
    pub llm_secondary_model: String,
    pub llm_external_api_key: Option<String>,

    pub request_deadline_secs: u64,
    pub golden_similarity_threshold: f32,

    pub worker_pool: WorkerPoolConfig,
    pub tier_policy: TierPolicyConfig,

    pub default_language: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            http_client: Client::new(),

            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/zantara".to_string()),
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),

            vector_store_url: std::env::var("QDRANT_URL")
                .unwrap_or_else(|_| "http://localhost:6333".to_string()),
            vector_store_api_key: std::env::var("QDRANT_API_KEY").ok(),

            embedding_provider: std::env::var("EMBEDDING_PROVIDER")
                .unwrap_or_else(|_| "openai".to_string()),
            embedding_api_key: std::env::var("EMBEDDING_API_KEY").ok(),
            embedding_dimensionality: std::env::var("EMBEDDING_DIMENSIONALITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1536),

            llm_primary_model: std::env::var("LLM_PRIMARY_MODEL")
                .unwrap_or_else(|_| "gemini-flash".to_string()),
            llm_secondary_model: std::env::var("LLM_SECONDARY_MODEL")
                .unwrap_or_else(|_| "gemini-flash-lite".to_string()),
            llm_external_api_key: std::env::var("LLM_EXTERNAL_API_KEY").ok(),

            request_deadline_secs: std::env::var("REQUEST_DEADLINE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            golden_similarity_threshold: std::env::var("GOLDEN_SIMILARITY_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.85),

            worker_pool: WorkerPoolConfig::default(),
            tier_policy: TierPolicyConfig::default(),

            default_language: std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane_without_env() {
        let cfg = AppConfig {
            http_client: Client::new(),
            database_url: "postgres://x".into(),
            redis_url: "redis://x".into(),
            vector_store_url: "http://x".into(),
            vector_store_api_key: None,
            embedding_provider: "openai".into(),
            embedding_api_key: None,
            embedding_dimensionality: 1536,
            llm_primary_model: "gemini-flash".into(),
            llm_secondary_model: "gemini-flash-lite".into(),
            llm_external_api_key: None,
            request_deadline_secs: 60,
            golden_similarity_threshold: 0.85,
            worker_pool: WorkerPoolConfig::default(),
            tier_policy: TierPolicyConfig::default(),
            default_language: "en".into(),
        };
        assert_eq!(cfg.worker_pool.ingestion_workers, 4);
        assert_eq!(cfg.golden_similarity_threshold, 0.85);
    }
}
