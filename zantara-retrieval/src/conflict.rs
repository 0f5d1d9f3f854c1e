//! Pairwise contradiction detection over known predicates: numeric
//! thresholds (duration, fee) and dates.

use lazy_static::lazy_static;
use regex::Regex;

use super::RetrievedPassage;

lazy_static! {
    static ref DURATION_RE: Regex =
        Regex::new(r"(?i)(\d+)\s*(day|days|hari|month|months|bulan|year|years|tahun)").unwrap();
    static ref FEE_RE: Regex = Regex::new(r"(?i)(rp|idr|usd|\$)\s*([\d.,]+)").unwrap();
    static ref YEAR_RE: Regex = Regex::new(r"\b(19|20)\d{2}\b").unwrap();
}

/// A known predicate extracted from a passage: a keyword context plus a
/// normalized numeric value (e.g. duration in days, fee in raw digits).
#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    kind: &'static str,
    value: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct Conflict {
    pub description: String,
    pub first_index: usize,
    pub second_index: usize,
}

fn extract_predicates(text: &str) -> Vec<Predicate> {
    let mut out = Vec::new();
    if let Some(caps) = DURATION_RE.captures(text) {
        out.push(Predicate { kind: "duration", value: caps[1].to_string() });
    }
    if let Some(caps) = FEE_RE.captures(text) {
        out.push(Predicate { kind: "fee", value: caps[2].replace(['.', ','], "") });
    }
    if let Some(caps) = YEAR_RE.captures(text) {
        out.push(Predicate { kind: "year", value: caps[0].to_string() });
    }
    out
}

/// Pairwise-inspect the top passages for contradicting values on the same
/// predicate kind. O(n^2) over a small top-k list, which is the scale this
/// runs at: inspection of the top results, not the full corpus.
pub fn detect(passages: &[RetrievedPassage]) -> Vec<Conflict> {
    let extracted: Vec<Vec<Predicate>> = passages.iter().map(|p| extract_predicates(&p.text)).collect();

    let mut conflicts = Vec::new();
    for i in 0..passages.len() {
        for j in (i + 1)..passages.len() {
            for a in &extracted[i] {
                for b in &extracted[j] {
                    if a.kind == b.kind && a.value != b.value {
                        conflicts.push(Conflict {
                            description: format!(
                                "conflicting {} values: '{}' (result {}) vs '{}' (result {})",
                                a.kind, a.value, i, b.value, j
                            ),
                            first_index: i,
                            second_index: j,
                        });
                    }
                }
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str) -> RetrievedPassage {
        RetrievedPassage {
            text: text.to_string(),
            score: 1.0,
            parent_id: "doc".to_string(),
            chunk_index: 0,
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn detects_conflicting_durations() {
        let passages =
            vec![passage("KITAS is valid for 30 days"), passage("KITAS is valid for 60 days")];
        let conflicts = detect(&passages);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].description.contains("duration"), true);
    }

    #[test]
    fn no_conflict_when_values_agree() {
        let passages = vec![passage("valid for 30 days"), passage("valid for 30 days, per regulation")];
        assert!(detect(&passages).is_empty());
    }

    #[test]
    fn no_conflict_for_unrelated_predicates() {
        let passages = vec![passage("valid for 30 days"), passage("filed in 2023")];
        assert!(detect(&passages).is_empty());
    }
}
