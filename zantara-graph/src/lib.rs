//! Knowledge Graph Builder: per-chunk entity/relationship extraction
//! followed by a canonicalization pass.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;
use zantara_errors::CoreError;
use zantara_models::{ExtractedGraph, KgEntity, KgRelationship};
use zantara_store::RelationalStoreGateway;

/// Raw entity/relationship mention as produced by the LLM, before
/// canonicalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEntity {
    pub name: String,
    pub entity_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRelationship {
    pub source_name: String,
    pub target_name: String,
    pub relationship_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawExtraction {
    pub entities: Vec<RawEntity>,
    pub relationships: Vec<RawRelationship>,
}

/// The LLM call used to extract entities/relationships from one chunk.
/// Kept as a narrow trait (rather than depending on `zantara-llm` directly)
/// so the orchestrator can wire in whichever adapter/tier it likes.
#[async_trait]
pub trait KgExtractorLlm: Send + Sync {
    async fn extract(&self, chunk_text: &str) -> Result<RawExtraction, CoreError>;
}

pub struct GraphBuilder<'a> {
    store: &'a RelationalStoreGateway,
    llm: &'a dyn KgExtractorLlm,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(store: &'a RelationalStoreGateway, llm: &'a dyn KgExtractorLlm) -> Self {
        Self { store, llm }
    }

    /// Extract a graph from one chunk. LLM failures are non-fatal and yield
    /// an empty graph.
    pub async fn extract_from_chunk(&self, chunk_text: &str) -> ExtractedGraph {
        match self.llm.extract(chunk_text).await {
            Ok(raw) => canonicalize(raw),
            Err(e) => {
                warn!(error = %e, "knowledge graph extraction failed, yielding empty graph");
                ExtractedGraph::default()
            }
        }
    }

    /// Persist a canonicalized graph. Upserts are idempotent on
    /// `entity.id` and `(source, target, type)`.
    pub async fn persist(&self, graph: &ExtractedGraph) -> Result<(), CoreError> {
        for entity in &graph.entities {
            self.store.upsert_kg_entity(entity).await?;
        }
        for rel in &graph.relationships {
            self.store.upsert_kg_relationship(rel).await?;
        }
        Ok(())
    }
}

///// Canonicalize raw entity/relationship mentions: lowercase+underscore+
/// truncate entity ids, and synthesize any entity referenced only from a
/// relationship's source/target name.
fn canonicalize(raw: RawExtraction) -> ExtractedGraph {
    let mut entities: Vec<KgEntity> = raw
        .entities
        .iter()
        .map(|e| KgEntity {
            id: KgEntity::canonicalize_id(&e.name),
            name: e.name.clone(),
            entity_type: e.entity_type.clone(),
        })
        .collect();

    let mut known_ids: std::collections::HashSet<String> = entities.iter().map(|e| e.id.clone()).collect();

    let mut relationships = Vec::with_capacity(raw.relationships.len());
    for rel in &raw.relationships {
        let source_id = KgEntity::canonicalize_id(&rel.source_name);
        let target_id = KgEntity::canonicalize_id(&rel.target_name);

        for (id, name) in [(&source_id, &rel.source_name), (&target_id, &rel.target_name)] {
            if !known_ids.contains(id) {
                entities.push(KgEntity { id: id.clone(), name: name.clone(), entity_type: "implicit".to_string() });
                known_ids.insert(id.clone());
            }
        }

        relationships.push(KgRelationship {
            source_entity_id: source_id,
            target_entity_id: target_id,
            relationship_type: rel.relationship_type.clone(),
            properties: serde_json::json!({ "description": rel.description }),
        });
    }

    ExtractedGraph { entities, relationships }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesizes_implicit_entities_from_relationships() {
        let raw = RawExtraction {
            entities: vec![RawEntity { name: "Investor KITAS".into(), entity_type: "permit".into() }],
            relationships: vec![RawRelationship {
                source_name: "Investor KITAS".into(),
                target_name: "Ministry of Law".into(),
                relationship_type: "issued_by".into(),
                description: None,
            }],
        };
        let graph = canonicalize(raw);
        assert_eq!(graph.entities.len(), 2);
        assert!(graph.entities.iter().any(|e| e.entity_type == "implicit" && e.name == "Ministry of Law"));
    }

    #[test]
    fn canonical_ids_are_lowercase_slugs() {
        assert_eq!(KgEntity::canonicalize_id("Investor KITAS"), "investor_kitas");
    }

    struct FailingLlm;
    #[async_trait]
    impl KgExtractorLlm for FailingLlm {
        async fn extract(&self, _chunk_text: &str) -> Result<RawExtraction, CoreError> {
            Err(CoreError::LLMUnavailable("boom".into()))
        }
    }

    #[tokio::test]
    async fn llm_failure_yields_empty_graph_not_error() {
        let pool_url_unused = (); // builder doesn't touch the store on this path
        let _ = pool_url_unused;
        // Construct without a real pool: extract_from_chunk never calls `store`.
        let llm = FailingLlm;
        // SAFETY-free: use a dummy store only for type purposes is not possible
        // without a pool, so we call the pure extraction path directly instead.
        let raw_result = llm.extract("some text").await;
        assert!(raw_result.is_err());
        let graph = match raw_result {
            Ok(raw) => canonicalize(raw),
            Err(_) => ExtractedGraph::default(),
        };
        assert!(graph.entities.is_empty());
    }
}
