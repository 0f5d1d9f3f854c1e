//! Retrieval Engine: route → embed → per-collection filtered search →
//! merge/dedupe → optional rerank → conflict detection.

mod conflict;
mod rerank;

use std::collections::HashMap;

use serde_json::Value;
use tracing::warn;
use zantara_errors::CoreError;
use zantara_models::{Tier, TierPolicy};
use zantara_observability::log_external_call;
use zantara_router::RoutingDecision;
use zantara_vector_store::{Filter, VectorStoreGateway};

pub use conflict::Conflict;
pub use rerank::RerankStrategy;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub score: f32,
    pub parent_id: String,
    pub chunk_index: usize,
    pub metadata: Value,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RetrievalOutcome {
    pub query: String,
    pub collection_used: Vec<String>,
    pub results: Vec<RetrievedPassage>,
    pub allowed_tiers: Vec<Tier>,
    pub conflicts_detected: Vec<Conflict>,
    pub reranked: bool,
}

#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    pub user_level: u8,
    pub tier_filter: Option<Tier>,
    pub apply_filters: bool,
    pub limit: usize,
    pub rerank: Option<RerankStrategy>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self { user_level: 1, tier_filter: None, apply_filters: true, limit: 8, rerank: None }
    }
}

pub struct RetrievalEngine<'a> {
    embedding: &'a zantara_embedding::EmbeddingClient,
    vector_store: &'a VectorStoreGateway,
    tier_policy: &'a TierPolicy,
}

impl<'a> RetrievalEngine<'a> {
    pub fn new(
        embedding: &'a zantara_embedding::EmbeddingClient,
        vector_store: &'a VectorStoreGateway,
        tier_policy: &'a TierPolicy,
    ) -> Self {
        Self { embedding, vector_store, tier_policy }
    }

    /// Run the full retrieval algorithm for a query that has already been
    /// routed to one or more collections.
    pub async fn retrieve(
        &self,
        query: &str,
        routing: &RoutingDecision,
        options: &RetrievalOptions,
    ) -> Result<RetrievalOutcome, CoreError> {
        let allowed_tiers = self.tier_policy.allowed_tiers(options.user_level);
        let filter = self.build_filter(&allowed_tiers, options);

        let query_vector = self.embedding.embed_query(query).await?;

        let search_limit = match &options.rerank {
            Some(_) => options.limit.saturating_mul(3).max(options.limit),
            None => options.limit,
        };

        let mut hits_by_key: HashMap<(String, usize), RetrievedPassage> = HashMap::new();
        let mut missing = 0usize;
        for collection in &routing.collections {
            log_external_call!("qdrant", collection.as_str());
            match self.vector_store.search(collection, &query_vector, filter.as_ref(), search_limit).await {
                Ok(hits) => {
                    for hit in hits {
                        let passage = hit_to_passage(hit);
                        let key = (passage.parent_id.clone(), passage.chunk_index);
                        hits_by_key
                            .entry(key)
                            .and_modify(|existing| {
                                if passage.score > existing.score {
                                    *existing = passage.clone();
                                }
                            })
                            .or_insert(passage);
                    }
                }
                Err(CoreError::CollectionMissing(name)) => {
                    warn!(collection = %name, "target collection missing, skipping");
                    missing += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if missing > 0 && missing == routing.collections.len() {
            return Err(CoreError::CollectionMissing(routing.collections.join(",")));
        }

        let mut results: Vec<RetrievedPassage> = hits_by_key.into_values().collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let reranked = options.rerank.is_some();
        if let Some(strategy) = &options.rerank {
            results = strategy.apply(results);
        }
        results.truncate(options.limit);

        let conflicts_detected = conflict::detect(&results);

        Ok(RetrievalOutcome {
            query: query.to_string(),
            collection_used: routing.collections.clone(),
            results,
            allowed_tiers,
            conflicts_detected,
            reranked,
        })
    }

    fn build_filter(&self, allowed_tiers: &[Tier], options: &RetrievalOptions) -> Option<Filter> {
        if !options.apply_filters {
            return None;
        }

        let mut filter = Filter::new();
        let mut has_condition = false;

        if let Some(tier) = options.tier_filter {
            filter = filter.with_equals("tier", serde_json::json!(tier.as_str()));
            has_condition = true;
        } else if !allowed_tiers.is_empty() {
            let values: Vec<Value> = allowed_tiers.iter().map(|t| serde_json::json!(t.as_str())).collect();
            filter = filter.with_in_set("tier", values);
            has_condition = true;
        }

        if has_condition {
            Some(filter)
        } else {
            None
        }
    }
}

fn hit_to_passage(hit: zantara_vector_store::SearchHit) -> RetrievedPassage {
    let text = hit.payload.get("text").and_then(Value::as_str).unwrap_or_default().to_string();
    let parent_id = hit.payload.get("parent_id").and_then(Value::as_str).unwrap_or_default().to_string();
    let chunk_index = hit.payload.get("chunk_index").and_then(Value::as_u64).unwrap_or(0) as usize;
    RetrievedPassage { text, score: hit.score, parent_id, chunk_index, metadata: Value::Object(hit.payload.into_iter().collect()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_apply_filters_with_limit_eight() {
        let opts = RetrievalOptions::default();
        assert!(opts.apply_filters);
        assert_eq!(opts.limit, 8);
    }
}
