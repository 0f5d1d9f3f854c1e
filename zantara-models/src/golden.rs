//! Golden route / golden answer models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A curated canonical-query → collection mapping, with an attached dense
/// vector computed from `canonical_query` at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenRoute {
    pub route_id: String,
    pub canonical_query: String,
    pub target_collections: Vec<String>,
    pub document_id_hints: Vec<String>,
    pub chapter_id_hints: Vec<String>,
    /// Free-form routing hints: intent, entity, keyword.
    pub routing_hints: Value,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
}

/// A curated canonical question → answer pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenAnswer {
    pub cluster_id: String,
    pub canonical_question: String,
    pub answer_text: String,
    pub sources: Vec<String>,
    pub confidence: f32,
    pub usage_count: i64,
}

/// Maps a normalized-question hash to the cluster it belongs to, for fuzzy
/// (non-exact) golden-answer matching fallback bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryCluster {
    pub cluster_id: String,
    pub query_hash: String,
    pub query_text: String,
    pub frequency: i64,
}
