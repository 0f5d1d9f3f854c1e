//! Quality assessment: fingerprint, OCR-quality heuristics, incompleteness
//! and re-extract flags.

use sha2::{Digest, Sha256};

const GOOD_OCR_THRESHOLD: f32 = 0.85;
const REEXTRACT_SCORE_THRESHOLD: f32 = 0.6;
/// Fraction of digit/symbol characters above which a page is probably a
/// garbled OCR dump rather than prose.
const NOISE_RATIO_THRESHOLD: f32 = 0.35;

#[derive(Debug, Clone, PartialEq)]
pub struct QualityAssessment {
    pub text_fingerprint: String,
    pub ocr_quality_score: f32,
    pub is_incomplete: bool,
    pub needs_reextract: bool,
}

pub fn text_fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fraction of recognizable characters (alphanumeric, common punctuation,
/// whitespace) against the total — OCR garbage tends to be full of stray
/// symbols and control characters.
fn ocr_quality_score(text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let total = text.chars().count();
    let recognizable = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,;:()\"'-/".contains(*c))
        .count();
    recognizable as f32 / total as f32
}

fn noise_ratio(text: &str) -> f32 {
    if text.is_empty() {
        return 1.0;
    }
    let total = text.chars().count();
    let noisy = text.chars().filter(|c| c.is_ascii_digit() || (c.is_ascii_punctuation() && !".,;:()\"'-".contains(*c))).count();
    noisy as f32 / total as f32
}

/// Heuristic: the document ends mid-sentence (no terminal punctuation) or
/// carries an unusually high ratio of digits/symbols.
fn is_incomplete(text: &str) -> bool {
    let trimmed = text.trim_end();
    let ends_mid_sentence = !trimmed.is_empty()
        && !trimmed.ends_with(['.', '!', '?', '"', ')'])
        && trimmed.chars().last().map(|c| c.is_alphanumeric()).unwrap_or(false);
    ends_mid_sentence || noise_ratio(text) > NOISE_RATIO_THRESHOLD
}

pub fn assess(text: &str) -> QualityAssessment {
    let score = ocr_quality_score(text);
    let incomplete = is_incomplete(text);
    let needs_reextract = score < REEXTRACT_SCORE_THRESHOLD || incomplete;

    QualityAssessment {
        text_fingerprint: text_fingerprint(text),
        ocr_quality_score: score,
        is_incomplete: incomplete,
        needs_reextract,
    }
}

pub fn is_good_quality(score: f32) -> bool {
    score >= GOOD_OCR_THRESHOLD
}

/// True iff at least two of {type-marker regex, `Menimbang`, `Mengingat`,
/// `Pasal <n>`, `PRESIDEN`} fire.
pub fn is_legal_document(text: &str) -> bool {
    let mut hits = 0;
    if crate::classify::has_type_marker(text) {
        hits += 1;
    }
    if text.contains("Menimbang") {
        hits += 1;
    }
    if text.contains("Mengingat") {
        hits += 1;
    }
    if zantara_parser::structure::has_article_marker(text) {
        hits += 1;
    }
    if text.contains("PRESIDEN") {
        hits += 1;
    }
    hits >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable() {
        assert_eq!(text_fingerprint("hello"), text_fingerprint("hello"));
        assert_ne!(text_fingerprint("hello"), text_fingerprint("world"));
    }

    #[test]
    fn clean_prose_scores_well() {
        let text = "Pasal 1. Setiap warga negara berhak atas pendidikan yang layak.";
        let assessment = assess(text);
        assert!(is_good_quality(assessment.ocr_quality_score));
        assert!(!assessment.is_incomplete);
        assert!(!assessment.needs_reextract);
    }

    #[test]
    fn text_ending_mid_sentence_is_incomplete() {
        let text = "Pasal 1. Setiap warga negara berhak atas pendidikan yang";
        assert!(is_incomplete(text));
    }

    #[test]
    fn noisy_text_needs_reextract() {
        let text = "3#9 2$0 1@2 4%5 6^7 8&9 0*1 2(3 4)5 !@#$ %^&* ()_+ ";
        let assessment = assess(text);
        assert!(assessment.needs_reextract);
    }

    #[test]
    fn is_legal_document_needs_two_signals() {
        assert!(is_legal_document("UNDANG-UNDANG REPUBLIK INDONESIA\nMenimbang: bahwa..."));
        assert!(!is_legal_document("Pasal 1 of some random document"));
    }
}
