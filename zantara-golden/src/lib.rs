//! Golden Router & Answer Cache: an in-process route-embedding matrix
//! regenerated when the route count changes, plus an exact hash-based
//! answer lookup that precedes any embedding call.
//!
//! Two matchers, not one:
//! - **Golden Answer**: curated Q→A pair, looked up by MD5 of the
//!   normalized question via the `query_clusters` fuzzy-hash table. No
//!   embedding call needed; a hit is a final answer.
//! - **Golden Route**: curated query→collections mapping with an attached
//!   dense vector, matched by cosine similarity against the query
//!   embedding. A hit is a routing hint, not a final answer: the caller
//!   still runs retrieval, but against the route's forced collections.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;
use zantara_embedding::EmbeddingClient;
use zantara_errors::CoreError;
use zantara_models::{GoldenAnswer, GoldenRoute};
use zantara_observability::log_cache;
use zantara_store::RelationalStoreGateway;

/// Minimum cosine similarity for a semantic route match.
pub const SIMILARITY_THRESHOLD: f32 = 0.85;

/// Outcome of a combined golden check.
#[derive(Debug, Clone)]
pub enum GoldenCheck {
    /// Exact or fuzzy-hash hit: emit this answer immediately.
    AnswerHit(GoldenAnswer),
    /// Semantic route hit: not an answer, a forced-collection routing hint.
    RouteHit { route: GoldenRoute, score: f32 },
    Miss,
}

///// Normalize a question the way the exact-match hash is computed:
/// lowercase + trim. Punctuation is deliberately not stripped.
pub fn normalize_question(question: &str) -> String {
    question.trim().to_lowercase()
}

/// MD5 hex digest of the normalized question.
pub fn exact_hash(question: &str) -> String {
    format!("{:x}", md5::compute(normalize_question(question)))
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        0.0
    } else {
        dot_product / (magnitude_a * magnitude_b)
    }
}

struct RouteMatrix {
    /// Route count at generation time; a mismatch with the live route list
    /// triggers regeneration.
    generation: usize,
    vectors: Vec<Vec<f32>>,
}

/// Holds the in-process golden route/answer state. Cheap to construct;
/// callers typically wrap one instance in an `Arc` and share it across
/// request handlers.
pub struct GoldenCache {
    store: RelationalStoreGateway,
    embedding: Arc<EmbeddingClient>,
    routes: RwLock<Vec<GoldenRoute>>,
    matrix: RwLock<Option<RouteMatrix>>,
}

impl GoldenCache {
    pub fn new(store: RelationalStoreGateway, embedding: Arc<EmbeddingClient>) -> Self {
        Self { store, embedding, routes: RwLock::new(Vec::new()), matrix: RwLock::new(None) }
    }

    /// Load routes from the relational store and (re)build the embedding
    /// matrix if the route count has changed since the last build.
    pub async fn initialize(&self) -> Result<(), CoreError> {
        let routes = self.store.list_golden_routes().await?;
        let generation = routes.len();

        {
            let cached = self.matrix.read().await;
            if matches!(&*cached, Some(m) if m.generation == generation) {
                *self.routes.write().await = routes;
                return Ok(());
            }
        }

        let queries: Vec<String> = routes.iter().map(|r| r.canonical_query.clone()).collect();
        let vectors = if queries.is_empty() { Vec::new() } else { self.embedding.embed(&queries).await? };

        log_cache!(set, "golden_route_matrix");
        *self.matrix.write().await = Some(RouteMatrix { generation, vectors });
        *self.routes.write().await = routes;
        Ok(())
    }

    /// Exact-hash lookup, preceding any embedding call.
    pub async fn lookup_exact(&self, question: &str) -> Result<Option<GoldenAnswer>, CoreError> {
        let hash = exact_hash(question);
        let cluster = match self.store.find_query_cluster_by_hash(&hash).await? {
            Some(c) => c,
            None => {
                log_cache!(miss, hash.as_str());
                return Ok(None);
            }
        };

        let answer = self.store.find_golden_answer_by_cluster(&cluster.cluster_id).await?;
        if let Some(ref a) = answer {
            log_cache!(hit, hash.as_str());
            self.bump_answer_usage(&a.cluster_id);
        }
        Ok(answer)
    }

    /// Semantic cosine-similarity lookup against the route matrix. Caller
    /// supplies the already-computed query embedding.
    pub async fn lookup_semantic_route(&self, query_embedding: &[f32]) -> Option<(GoldenRoute, f32)> {
        let matrix = self.matrix.read().await;
        let matrix = matrix.as_ref()?;
        let routes = self.routes.read().await;

        let mut best: Option<(usize, f32)> = None;
        for (index, vector) in matrix.vectors.iter().enumerate() {
            let score = cosine_similarity(query_embedding, vector);
            if best.map(|(_, best_score)| score > best_score).unwrap_or(true) {
                best = Some((index, score));
            }
        }

        let (index, score) = best?;
        if score < SIMILARITY_THRESHOLD {
            return None;
        }
        let route = routes.get(index)?.clone();
        self.bump_route_usage(&route.route_id);
        Some((route, score))
    }

    /// Combined check: exact answer first, falling back to semantic route
    /// matching only if the exact lookup misses. Embeds the query lazily,
    /// only when the exact stage misses.
    pub async fn check(
        &self,
        question: &str,
        embed_query: impl std::future::Future<Output = Result<Vec<f32>, CoreError>>,
    ) -> Result<GoldenCheck, CoreError> {
        if let Some(answer) = self.lookup_exact(question).await? {
            return Ok(GoldenCheck::AnswerHit(answer));
        }

        let query_embedding = embed_query.await?;
        match self.lookup_semantic_route(&query_embedding).await {
            Some((route, score)) => Ok(GoldenCheck::RouteHit { route, score }),
            None => Ok(GoldenCheck::Miss),
        }
    }

    /// Fire-and-forget usage bump; never blocks the reply.
    fn bump_answer_usage(&self, cluster_id: &str) {
        let store = self.store.clone();
        let cluster_id = cluster_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = store.increment_answer_usage(&cluster_id).await {
                warn!(cluster_id = %cluster_id, error = %e, "failed to bump golden answer usage count");
            }
        });
    }

    fn bump_route_usage(&self, route_id: &str) {
        let store = self.store.clone();
        let route_id = route_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = store.increment_route_usage(&route_id).await {
                warn!(route_id = %route_id, error = %e, "failed to bump golden route usage count");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims_without_stripping_punctuation() {
        assert_eq!(normalize_question("  What is KITAS?  "), "what is kitas?");
    }

    #[test]
    fn exact_hash_is_stable_for_equivalent_surface_forms() {
        assert_eq!(exact_hash("What is KITAS?"), exact_hash("  what is kitas?  "));
    }

    #[test]
    fn exact_hash_differs_on_punctuation() {
        assert_ne!(exact_hash("what is kitas"), exact_hash("what is kitas?"));
    }

    #[test]
    fn cosine_similarity_of_identical_vectors_is_one() {
        let v = vec![0.1, 0.2, 0.3];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_similarity_handles_zero_vector_without_panicking() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
