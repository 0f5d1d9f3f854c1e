//! Parent document model — the indexer's unit of record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed set of recognized document types. `classify` (zantara-metadata)
/// never returns anything outside this set; unknown inputs map to `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Statute,
    Regulation,
    MinisterialDecree,
    CourtRuling,
    KbliCode,
    Pricing,
    Generic,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Statute => "statute",
            DocumentType::Regulation => "regulation",
            DocumentType::MinisterialDecree => "ministerial-decree",
            DocumentType::CourtRuling => "court-ruling",
            DocumentType::KbliCode => "kbli-code",
            DocumentType::Pricing => "pricing",
            DocumentType::Generic => "generic",
        }
    }
}

/// Legal status of a document, when known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Active,
    Repealed,
}

/// A parent document row (`parent_documents` table).
///
/// `pasal_count` deliberately doubles as a generic chunk count for
/// non-legal parents — see DESIGN.md's note on the preserved schema
/// overload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentDocument {
    /// Stable id derived from the source filename stem (first 64 chars).
    pub id: String,
    pub document_id: String,
    pub doc_type: DocumentType,
    pub title: String,
    pub year: Option<u16>,
    pub number: Option<String>,
    pub topic: String,
    pub status: Option<DocumentStatus>,
    pub full_text: String,
    pub summary: String,
    pub metadata: Value,
    pub text_fingerprint: String,
    pub ocr_quality_score: f32,
    pub is_incomplete: bool,
    pub needs_reextract: bool,
    /// Overloaded: pasal (article) count for legal docs, raw chunk count
    /// for everything else.
    pub pasal_count: i32,
    pub char_count: i32,
    pub created_at: DateTime<Utc>,
}

impl ParentDocument {
    /// Stable document id derived from a source filename.
    pub fn id_from_filename(filename: &str) -> String {
        let stem = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(filename);
        stem.chars().take(64).collect()
    }
}
