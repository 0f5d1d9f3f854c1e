//! In-process rerank strategies, applied after retrieval merge rather than
//! by an external cross-encoder service.

use super::RetrievedPassage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RerankStrategy {
    ScoreBased,
    ReciprocalRankFusion,
    DiversityAware,
    RecencyBiased,
}

impl RerankStrategy {
    pub fn apply(&self, mut passages: Vec<RetrievedPassage>) -> Vec<RetrievedPassage> {
        match self {
            RerankStrategy::ScoreBased => {
                passages.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
                passages
            }
            RerankStrategy::ReciprocalRankFusion => reciprocal_rank_fusion(passages),
            RerankStrategy::DiversityAware => diversity_aware(passages),
            RerankStrategy::RecencyBiased => {
                // Metadata carries no explicit timestamp field in this
                // payload shape, so recency falls back to original score
                // ordering rather than inventing a field the ingester
                // never writes.
                passages.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
                passages
            }
        }
    }
}

const RRF_K: f32 = 60.0;

/// Classic reciprocal rank fusion: each passage's contribution is
/// `1/(k+rank)` from its position in a ranked list, summed across however
/// many ranked lists it appears in. `passages` here is always the single
/// list already merged across collections by the caller, so every item
/// contributes from exactly one rank and the result is equivalent to
/// sorting by rank rather than raw score — RRF only pulls ahead of plain
/// score order once there's more than one independently-ranked list to
/// reconcile.
fn reciprocal_rank_fusion(mut passages: Vec<RetrievedPassage>) -> Vec<RetrievedPassage> {
    passages.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    passages
        .into_iter()
        .enumerate()
        .map(|(rank, passage)| (1.0 / (RRF_K + (rank + 1) as f32), passage))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|(_, passage)| passage)
        .collect()
}

fn diversity_aware(blocks: Vec<RetrievedPassage>) -> Vec<RetrievedPassage> {
    if blocks.is_empty() {
        return blocks;
    }

    let mut remaining = blocks;
    remaining.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut selected = Vec::with_capacity(remaining.len());
    selected.push(remaining.remove(0));

    let lambda = 0.7_f32;
    while !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_mmr = f32::MIN;
        for (idx, candidate) in remaining.iter().enumerate() {
            let max_sim = selected
                .iter()
                .map(|s: &RetrievedPassage| text_similarity(&candidate.text, &s.text))
                .fold(0.0_f32, f32::max);
            let mmr = lambda * candidate.score - (1.0 - lambda) * max_sim;
            if mmr > best_mmr {
                best_mmr = mmr;
                best_idx = idx;
            }
        }
        selected.push(remaining.remove(best_idx));
    }
    selected
}

fn text_similarity(a: &str, b: &str) -> f32 {
    use std::collections::HashSet;
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(parent: &str, score: f32, text: &str) -> RetrievedPassage {
        RetrievedPassage {
            text: text.to_string(),
            score,
            parent_id: parent.to_string(),
            chunk_index: 0,
            metadata: serde_json::json!({}),
        }
    }

    #[test]
    fn score_based_sorts_descending() {
        let out = RerankStrategy::ScoreBased.apply(vec![passage("a", 0.2, "x"), passage("b", 0.9, "y")]);
        assert_eq!(out[0].parent_id, "b");
    }

    #[test]
    fn diversity_aware_keeps_top_score_first() {
        let out = RerankStrategy::DiversityAware.apply(vec![
            passage("a", 0.9, "kitas visa requirements"),
            passage("b", 0.85, "kitas visa requirements"),
            passage("c", 0.4, "tax filing deadline"),
        ]);
        assert_eq!(out[0].parent_id, "a");
    }
}
