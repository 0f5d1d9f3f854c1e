//! Ingestion Orchestrator: read → analyze → route → chunk → (KG extract,
//! HyDE, embed) → batch upsert → persist parent, as a batched per-item
//! pipeline with bounded per-chunk fan-out.

pub mod routing;

use std::collections::HashMap;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use tracing::warn;
use zantara_errors::CoreError;
use zantara_graph::GraphBuilder;
use zantara_metadata::{assess_quality, classify_document, build_full_title};
use zantara_models::{DocumentStatus, DocumentType, HierarchicalChunk, ParentDocument, Tier};
use zantara_observability::log_ingest;
use zantara_parser::parse_and_chunk;
use zantara_store::RelationalStoreGateway;
use zantara_vector_store::{Point, VectorStoreGateway};

pub use routing::{route_collection, RoutingDecision};

/// Hard cap on chunks emitted per file, to bound reference-file blow-up.
pub const MAX_CHUNKS_PER_FILE: usize = 300;
/// First K chunks per document get knowledge-graph extraction.
pub const DEFAULT_KG_CHUNK_LIMIT: usize = 2;
/// Vector-store batch upsert ceiling.
pub const MAX_UPSERT_BATCH: usize = 100;
/// Below this OCR quality score, strict mode skips the embedding stage.
pub const STRICT_QUALITY_FLOOR: f32 = 0.3;

/// Generates hypothetical questions (HyDE) for a chunk via a cheap LLM
/// call. Kept narrow like `zantara_graph::KgExtractorLlm` so the
/// orchestrator binary can wire in whichever adapter/tier it likes.
#[async_trait]
pub trait HydeQuestionGenerator: Send + Sync {
    async fn generate(&self, chunk_text: &str) -> Result<Vec<String>, CoreError>;
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub worker_pool_size: usize,
    pub chunk_cap: usize,
    pub kg_chunk_limit: usize,
    pub batch_upsert_size: usize,
    /// When true, documents scoring below `STRICT_QUALITY_FLOOR` skip the
    /// embedding stage entirely.
    pub strict_quality: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 4,
            chunk_cap: MAX_CHUNKS_PER_FILE,
            kg_chunk_limit: DEFAULT_KG_CHUNK_LIMIT,
            batch_upsert_size: MAX_UPSERT_BATCH,
            strict_quality: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub document_id: String,
    pub collection: String,
    pub chunks_created: usize,
    pub skipped: bool,
    pub needs_reextract: bool,
}

pub struct IngestionOrchestrator<'a> {
    embedding: &'a zantara_embedding::EmbeddingClient,
    vector_store: &'a VectorStoreGateway,
    relational_store: &'a RelationalStoreGateway,
    graph_builder: Option<&'a GraphBuilder<'a>>,
    hyde: &'a dyn HydeQuestionGenerator,
    config: IngestConfig,
}

impl<'a> IngestionOrchestrator<'a> {
    pub fn new(
        embedding: &'a zantara_embedding::EmbeddingClient,
        vector_store: &'a VectorStoreGateway,
        relational_store: &'a RelationalStoreGateway,
        graph_builder: Option<&'a GraphBuilder<'a>>,
        hyde: &'a dyn HydeQuestionGenerator,
        config: IngestConfig,
    ) -> Self {
        Self { embedding, vector_store, relational_store, graph_builder, hyde, config }
    }

    /// Ingest a batch of files, sequentially. A single file's failure does
    /// not abort the batch.
    pub async fn process_batch(
        &self,
        files: Vec<(Vec<u8>, String)>,
        tier_override: Option<Tier>,
        collection_override: Option<String>,
    ) -> Vec<Result<IngestReport, CoreError>> {
        let mut results = Vec::with_capacity(files.len());
        for (bytes, filename) in files {
            let result = self.process_file(&bytes, &filename, tier_override, collection_override.clone()).await;
            if let Err(ref e) = result {
                warn!(file = %filename, error = %e, "file ingestion failed");
            }
            results.push(result);
        }
        results
    }

    /// Ingest a single file. Parsing, classification, and routing abort the
    /// file on error; per-chunk failures during point preparation are
    /// logged and skipped.
    pub async fn process_file(
        &self,
        bytes: &[u8],
        filename: &str,
        tier_override: Option<Tier>,
        collection_override: Option<String>,
    ) -> Result<IngestReport, CoreError> {
        let document_id = ParentDocument::id_from_filename(filename);
        log_ingest!("start", filename);

        // Step 3 happens after parsing, but the fingerprint used for dedup is
        // computed from raw text, so parse first and check dedup against it.
        let parsed = parse_and_chunk(bytes, filename, &document_id)?;
        let quality = assess_quality(&parsed.text);

        if let Some(existing) = self.relational_store.find_parent_document_by_document_id(&document_id).await? {
            if existing.text_fingerprint == quality.text_fingerprint {
                log_ingest!("skip_duplicate", filename);
                return Ok(IngestReport {
                    document_id,
                    collection: existing.metadata["collection"].as_str().unwrap_or("generic").to_string(),
                    chunks_created: 0,
                    skipped: true,
                    needs_reextract: existing.needs_reextract,
                });
            }
        }

        let classification = classify_document(&parsed.text);
        let (doc_type, title, topic, year, number, status) = match &classification {
            Some(c) => (c.doc_type, build_full_title(c), c.topic.clone(), c.year.parse::<u16>().ok(), Some(c.number.clone()), c.status),
            None => (DocumentType::Generic, document_id.clone(), "UNKNOWN".to_string(), None, None, None),
        };

        let collection_name: String = collection_override
            .unwrap_or_else(|| route_collection(doc_type, filename).collection_name.to_string());

        let skip_embedding = self.config.strict_quality && quality.ocr_quality_score < STRICT_QUALITY_FLOOR;

        let mut chunks_created = 0usize;
        if !skip_embedding {
            self.vector_store.ensure_collection(&collection_name, self.embedding.dimensionality()).await?;

            let mut chunks = parsed.chunks;
            if chunks.len() > self.config.chunk_cap {
                chunks.truncate(self.config.chunk_cap);
            }

            let points = self
                .prepare_points(&chunks, &document_id, &title, tier_override, &collection_name)
                .await;
            chunks_created = points.len();

            for batch in points.chunks(self.config.batch_upsert_size) {
                self.vector_store
                    .upsert(&collection_name, self.embedding.dimensionality(), batch.to_vec())
                    .await?;
            }
        }

        let parent = ParentDocument {
            id: document_id.clone(),
            document_id: document_id.clone(),
            doc_type,
            title: title.clone(),
            year,
            number,
            topic: topic.clone(),
            status,
            full_text: parsed.text.clone(),
            summary: String::new(),
            metadata: json!({
                "year": year,
                "number": parent_number(&classification),
                "topic": topic,
                "status": status_str(status),
                "summary": "",
                "collection": collection_name,
            }),
            text_fingerprint: quality.text_fingerprint,
            ocr_quality_score: quality.ocr_quality_score,
            is_incomplete: quality.is_incomplete,
            needs_reextract: quality.needs_reextract,
            pasal_count: parsed.structure.chapters.iter().map(|c| c.articles.len()).sum::<usize>() as i32,
            char_count: parsed.text.chars().count() as i32,
            created_at: chrono::Utc::now(),
        };
        self.relational_store.upsert_parent_document(&parent).await?;

        log_ingest!("complete", filename, chunks_created);
        Ok(IngestReport {
            document_id,
            collection: collection_name,
            chunks_created,
            skipped: false,
            needs_reextract: quality.needs_reextract,
        })
    }

    /// Per-chunk fan-out with a bounded worker pool.
    /// Each chunk's KG extraction / HyDE / embedding runs independently;
    /// a failing chunk is logged and dropped, never aborts the file.
    async fn prepare_points(
        &self,
        chunks: &[HierarchicalChunk],
        document_id: &str,
        title: &str,
        tier_override: Option<Tier>,
        collection: &str,
    ) -> Vec<Point> {
        let kg_limit = self.config.kg_chunk_limit;
        let tier = tier_override.unwrap_or(Tier::D);

        let results = stream::iter(chunks.iter().enumerate())
            .map(|(index, chunk)| {
                let do_kg = index < kg_limit;
                async move { self.process_one_chunk(chunk, index, document_id, title, tier, collection, do_kg).await }
            })
            .buffer_unordered(self.config.worker_pool_size)
            .collect::<Vec<_>>()
            .await;

        results.into_iter().flatten().collect()
    }

    async fn process_one_chunk(
        &self,
        chunk: &HierarchicalChunk,
        index: usize,
        document_id: &str,
        title: &str,
        tier: Tier,
        collection: &str,
        do_kg: bool,
    ) -> Option<Point> {
        if do_kg {
            if let Some(builder) = self.graph_builder {
                let graph = builder.extract_from_chunk(&chunk.text).await;
                if let Err(e) = builder.persist(&graph).await {
                    warn!(chunk = %chunk.logical_id, error = %e, "failed to persist knowledge graph for chunk");
                }
            }
        }

        let hyde_questions = match self.hyde.generate(&chunk.text).await {
            Ok(qs) => qs,
            Err(e) => {
                warn!(chunk = %chunk.logical_id, error = %e, "HyDE question generation failed, continuing without it");
                Vec::new()
            }
        };

        let vector = match self.embedding.embed_query(&chunk.text).await {
            Ok(v) => v,
            Err(e) => {
                warn!(chunk = %chunk.logical_id, error = %e, "embedding failed, skipping chunk");
                return None;
            }
        };

        let mut payload: HashMap<String, Value> = HashMap::new();
        payload.insert("text".to_string(), json!(chunk.text));
        payload.insert("parent_id".to_string(), json!(document_id));
        payload.insert("chunk_index".to_string(), json!(index));
        payload.insert("hyde_questions".to_string(), json!(hyde_questions));
        payload.insert("source_file".to_string(), json!(document_id));
        payload.insert("title".to_string(), json!(title));
        payload.insert("tier".to_string(), json!(tier.as_str()));
        payload.insert("min_level".to_string(), json!(1));
        payload.insert("language".to_string(), json!("id"));
        payload.insert("collection".to_string(), json!(collection));

        Some(Point { id: chunk.point_id(), vector, payload })
    }
}

fn status_str(status: Option<DocumentStatus>) -> Option<&'static str> {
    status.map(|s| match s {
        DocumentStatus::Active => "active",
        DocumentStatus::Repealed => "repealed",
    })
}

fn parent_number(classification: &Option<zantara_metadata::ClassifyResult>) -> Option<String> {
    classification.as_ref().map(|c| c.number.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_quality_floor_is_point_three() {
        assert_eq!(STRICT_QUALITY_FLOOR, 0.3);
    }

    #[test]
    fn chunk_cap_is_three_hundred() {
        assert_eq!(MAX_CHUNKS_PER_FILE, 300);
    }
}
