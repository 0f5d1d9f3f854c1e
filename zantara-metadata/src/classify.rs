//! Classify: regex-based legal-document metadata extraction.

use lazy_static::lazy_static;
use regex::Regex;
use zantara_models::{DocumentStatus, DocumentType};

const UNKNOWN: &str = "UNKNOWN";
const MAX_TOPIC_CHARS: usize = 200;

/// (full name regex fragment, abbreviation, mapped DocumentType)
const TYPE_MARKERS: &[(&str, &str, DocumentType)] = &[
    ("UNDANG-UNDANG", "UU", DocumentType::Statute),
    ("PERATURAN PEMERINTAH", "PP", DocumentType::Regulation),
    ("KEPUTUSAN PRESIDEN", "Keppres", DocumentType::Regulation),
    ("PERATURAN MENTERI", "Permen", DocumentType::MinisterialDecree),
    ("QANUN", "Qanun", DocumentType::Regulation),
    ("PERATURAN DAERAH", "Perda", DocumentType::Regulation),
    ("PUTUSAN", "Putusan", DocumentType::CourtRuling),
];

lazy_static! {
    static ref NUMBER_RE: Regex = Regex::new(r"NOMOR\s+([0-9]+[A-Za-z]?)\s+TAHUN").unwrap();
    static ref YEAR_RE: Regex = Regex::new(r"TAHUN\s+(\d{4})").unwrap();
    static ref TOPIC_RE: Regex = Regex::new(r"(?s)TENTANG\s+(.+?)(?:\n\s*\n|DENGAN RAHMAT|$)").unwrap();
    static ref STATUS_DICABUT_RE: Regex = Regex::new(r"(?i)dicabut").unwrap();
    static ref STATUS_BERLAKU_RE: Regex = Regex::new(r"(?i)berlaku").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifyResult {
    pub doc_type: DocumentType,
    pub type_label: String,
    pub type_abbrev: String,
    pub number: String,
    pub year: String,
    pub topic: String,
    pub status: Option<DocumentStatus>,
}

pub fn has_type_marker(text: &str) -> bool {
    TYPE_MARKERS.iter().any(|(label, _, _)| text.contains(label))
}

/// Regex-classify a document's metadata. Missing fields fall back to the
/// literal string `"UNKNOWN"`; empty/whitespace-only input returns `None`.
pub fn classify(text: &str) -> Option<ClassifyResult> {
    if text.trim().is_empty() {
        return None;
    }

    let (doc_type, type_label, type_abbrev) = TYPE_MARKERS
        .iter()
        .find(|(label, _, _)| text.contains(label))
        .map(|(label, abbrev, dtype)| (*dtype, label.to_string(), abbrev.to_string()))
        .unwrap_or((DocumentType::Generic, UNKNOWN.to_string(), UNKNOWN.to_string()));

    let number = NUMBER_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let year = YEAR_RE
        .captures(text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let topic = TOPIC_RE
        .captures(text)
        .map(|c| {
            let raw = c[1].trim().replace('\n', " ");
            let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            normalized.chars().take(MAX_TOPIC_CHARS).collect::<String>()
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());

    let status = if STATUS_DICABUT_RE.is_match(text) {
        Some(DocumentStatus::Repealed)
    } else if STATUS_BERLAKU_RE.is_match(text) {
        Some(DocumentStatus::Active)
    } else {
        None
    };

    Some(ClassifyResult { doc_type, type_label, type_abbrev, number, year, topic, status })
}

/// Compose a canonical title string from classified fields.
pub fn build_full_title(result: &ClassifyResult) -> String {
    if result.type_label == UNKNOWN && result.number == UNKNOWN && result.year == UNKNOWN && result.topic == UNKNOWN {
        return "Unknown Legal Document".to_string();
    }
    format!(
        "{} No. {} Tahun {} tentang {}",
        result.type_label, result.number, result.year, result.topic
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_undang_undang() {
        let text = "\nUNDANG-UNDANG REPUBLIK INDONESIA\nNOMOR 6 TAHUN 2011\nTENTANG KEIMIGRASIAN\n";
        let r = classify(text).unwrap();
        assert_eq!(r.type_label, "UNDANG-UNDANG");
        assert_eq!(r.type_abbrev, "UU");
        assert_eq!(r.number, "6");
        assert_eq!(r.year, "2011");
        assert_eq!(r.topic, "KEIMIGRASIAN");
    }

    #[test]
    fn unknown_type_falls_back() {
        let text = "\nSOME UNKNOWN DOCUMENT\nNOMOR 1 TAHUN 2024\nTENTANG SOMETHING\n";
        let r = classify(text).unwrap();
        assert_eq!(r.type_label, UNKNOWN);
        assert_eq!(r.type_abbrev, UNKNOWN);
    }

    #[test]
    fn missing_number_is_unknown() {
        let text = "\nUNDANG-UNDANG REPUBLIK INDONESIA\nTAHUN 2011\nTENTANG KEIMIGRASIAN\n";
        let r = classify(text).unwrap();
        assert_eq!(r.number, UNKNOWN);
    }

    #[test]
    fn long_topic_is_truncated() {
        let long_topic = "A".repeat(500);
        let text = format!("\nUNDANG-UNDANG REPUBLIK INDONESIA\nNOMOR 6 TAHUN 2011\nTENTANG {long_topic}\n");
        let r = classify(&text).unwrap();
        assert!(r.topic.len() <= MAX_TOPIC_CHARS);
    }

    #[test]
    fn status_dicabut_detected() {
        let text = "\nUNDANG-UNDANG REPUBLIK INDONESIA\nNOMOR 6 TAHUN 2011\nTENTANG KEIMIGRASIAN\n\nStatus: DICABUT DAN DINYATAKAN TIDAK BERLAKU\n";
        let r = classify(text).unwrap();
        assert_eq!(r.status, Some(DocumentStatus::Repealed));
    }

    #[test]
    fn empty_text_returns_none() {
        assert!(classify("").is_none());
        assert!(classify("   \n\t  ").is_none());
    }

    #[test]
    fn unknown_everything_yields_unknown_title() {
        let r = ClassifyResult {
            doc_type: zantara_models::DocumentType::Generic,
            type_label: UNKNOWN.to_string(),
            type_abbrev: UNKNOWN.to_string(),
            number: UNKNOWN.to_string(),
            year: UNKNOWN.to_string(),
            topic: UNKNOWN.to_string(),
            status: None,
        };
        assert_eq!(build_full_title(&r), "Unknown Legal Document");
    }
}
