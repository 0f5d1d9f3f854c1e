//! Metadata & Quality Extractor: two independent functions, `classify` and
//! quality `assess`, plus the `is_legal_document` predicate.

pub mod classify;
pub mod quality;

pub use classify::{build_full_title, classify as classify_document, ClassifyResult};
pub use quality::{assess as assess_quality, is_legal_document, QualityAssessment};
