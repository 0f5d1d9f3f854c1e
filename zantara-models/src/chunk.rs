//! Hierarchical chunk model.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Namespace used to derive deterministic per-chunk point ids: UUIDv5 over
/// a fixed namespace and chunk id, so re-ingest overwrites deterministically.
pub const CHUNK_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6b, 0xa7, 0xb8, 0x10, 0x9d, 0xad, 0x11, 0xd1, 0x80, 0xb4, 0x00, 0xc0, 0x4f, 0xd4, 0x30, 0xc8,
]);

/// Position of a chunk in the BAB → Pasal → Ayat hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum HierarchyLevel {
    Document = 0,
    Chapter = 1,
    Section = 2,
    Article = 3,
    Clause = 4,
}

/// A chunk ready for embedding + upsert, carrying hierarchy back-references
/// by id only, never by pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchicalChunk {
    /// Logical chunk id, e.g. `"UU_6_2023_Pasal_15"`.
    pub logical_id: String,
    pub text: String,
    pub document_id: String,
    pub chapter_id: Option<String>,
    pub article_id: Option<String>,
    /// Slash-delimited breadcrumb, e.g. `"UU_6_2023/BAB_III/Pasal_15"`.
    pub hierarchy_path: String,
    pub hierarchy_level: HierarchyLevel,
    /// Ordered root → immediate parent.
    pub parent_chunk_ids: Vec<String>,
    pub sibling_chunk_ids: Vec<String>,
    pub chapter_title: Option<String>,
    pub metadata: Value,
    pub detected_clause_numbers: Vec<u32>,
    pub clause_sequence_valid: bool,
}

impl HierarchicalChunk {
    /// Deterministic vector-store point id for this chunk: chunk id →
    /// UUIDv5 is stable, so upserts are idempotent.
    pub fn point_id(&self) -> Uuid {
        Uuid::new_v5(&CHUNK_NAMESPACE, self.logical_id.as_bytes())
    }
}
