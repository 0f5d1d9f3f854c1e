//! External-interface DTOs. No HTTP transport lives in this workspace;
//! these are the request/response shapes the orchestrator crate accepts
//! and returns from its library API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::memory::FeedbackType;
use crate::tier::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Conversational,
    Structured,
}

impl Default for ResponseFormat {
    fn default() -> Self {
        ResponseFormat::Conversational
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    pub user_email: Option<String>,
    pub session_id: Option<Uuid>,
    pub language_override: Option<String>,
    #[serde(default)]
    pub response_format: ResponseFormat,
    pub domain_hint: Option<String>,
    pub collection_override: Option<String>,
    pub context_docs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub doc_id: String,
    pub title: String,
    pub chunk_index: i32,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub model_used: String,
    pub sources: Vec<SourceRef>,
    pub conflicts: Vec<String>,
    pub mode: String,
    pub latency_ms: u64,
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub session_id: Uuid,
    pub rating: u8,
    pub feedback_type: Option<FeedbackType>,
    pub feedback_text: Option<String>,
    pub turn_count: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub rating_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestionRequest {
    pub file_path: String,
    pub title: Option<String>,
    pub tier_override: Option<Tier>,
    pub collection_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchIngestionRequest {
    pub file_paths: Vec<String>,
    pub collection_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionResponse {
    pub success: bool,
    pub book_title: String,
    pub chunks_created: i32,
    pub legal_metadata: serde_json::Value,
    pub structure: serde_json::Value,
    pub message: String,
}

/// The shared error envelope carried on every failure path.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorShape {
    pub error_code: String,
    pub message: String,
    pub request_id: Uuid,
}
