//! Knowledge-graph entity/relation models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A knowledge-graph entity. `id` is a canonicalized slug (≤64 chars).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgEntity {
    pub id: String,
    pub name: String,
    /// Open string: "law", "org", "concept", "permit", …
    pub entity_type: String,
}

impl KgEntity {
    /// Canonicalize a raw entity name into a stable slug id: lowercase,
    /// spaces → underscores, truncated to 64 chars.
    pub fn canonicalize_id(name: &str) -> String {
        let lowered = name.trim().to_lowercase().replace(' ', "_");
        lowered.chars().take(64).collect()
    }
}

/// A relation between two entities. Unique on `(source, target, type)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KgRelationship {
    pub source_entity_id: String,
    pub target_entity_id: String,
    pub relationship_type: String,
    pub properties: Value,
}

/// Output of a single knowledge-graph extraction call over one chunk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedGraph {
    pub entities: Vec<KgEntity>,
    pub relationships: Vec<KgRelationship>,
}
