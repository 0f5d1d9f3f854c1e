//! `golden_routes` / `golden_answers` / `query_clusters` table access.

use zantara_errors::CoreError;
use zantara_models::{GoldenAnswer, GoldenRoute, QueryCluster};
use zantara_observability::log_db;

use crate::{map_acquire_error, RelationalStoreGateway};

impl RelationalStoreGateway {
    pub async fn list_golden_routes(&self) -> Result<Vec<GoldenRoute>, CoreError> {
        log_db!("select", "golden_routes");
        let rows = sqlx::query_as::<_, GoldenRouteRow>(
            "SELECT route_id, canonical_query, collections, document_ids, routing_hints, usage_count, created_at
             FROM golden_routes",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All golden answers, for semantic-cache matrix construction.
    pub async fn list_golden_answers(&self) -> Result<Vec<GoldenAnswer>, CoreError> {
        log_db!("select", "golden_answers");
        let rows = sqlx::query_as::<_, GoldenAnswerRow>(
            "SELECT cluster_id, canonical_question, answer, sources, confidence, usage_count
             FROM golden_answers",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn insert_golden_route(&self, route: &GoldenRoute) -> Result<(), CoreError> {
        log_db!("insert", "golden_routes", &route.route_id);
        sqlx::query(
            "INSERT INTO golden_routes (route_id, canonical_query, collections, document_ids, routing_hints, usage_count, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (route_id) DO UPDATE SET
                canonical_query = excluded.canonical_query,
                collections = excluded.collections,
                document_ids = excluded.document_ids,
                routing_hints = excluded.routing_hints",
        )
        .bind(&route.route_id)
        .bind(&route.canonical_query)
        .bind(&route.target_collections)
        .bind(&route.document_id_hints)
        .bind(&route.routing_hints)
        .bind(route.usage_count)
        .bind(route.created_at)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }

    /// Fire-and-forget usage bump; callers should not block a reply on this.
    pub async fn increment_route_usage(&self, route_id: &str) -> Result<(), CoreError> {
        sqlx::query("UPDATE golden_routes SET usage_count = usage_count + 1 WHERE route_id = $1")
            .bind(route_id)
            .execute(self.pool())
            .await
            .map_err(map_acquire_error)?;
        Ok(())
    }

    pub async fn find_golden_answer_by_cluster(
        &self,
        cluster_id: &str,
    ) -> Result<Option<GoldenAnswer>, CoreError> {
        log_db!("select", "golden_answers", cluster_id);
        let row = sqlx::query_as::<_, GoldenAnswerRow>(
            "SELECT cluster_id, canonical_question, answer, sources, confidence, usage_count
             FROM golden_answers WHERE cluster_id = $1",
        )
        .bind(cluster_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(row.map(Into::into))
    }

    pub async fn find_query_cluster_by_hash(
        &self,
        query_hash: &str,
    ) -> Result<Option<QueryCluster>, CoreError> {
        log_db!("select", "query_clusters", query_hash);
        let row = sqlx::query_as::<_, QueryClusterRow>(
            "SELECT cluster_id, query_hash, query_text, frequency FROM query_clusters WHERE query_hash = $1",
        )
        .bind(query_hash)
        .fetch_optional(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(row.map(Into::into))
    }

    pub async fn increment_answer_usage(&self, cluster_id: &str) -> Result<(), CoreError> {
        sqlx::query("UPDATE golden_answers SET usage_count = usage_count + 1 WHERE cluster_id = $1")
            .bind(cluster_id)
            .execute(self.pool())
            .await
            .map_err(map_acquire_error)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct GoldenRouteRow {
    route_id: String,
    canonical_query: String,
    collections: Vec<String>,
    document_ids: Vec<String>,
    routing_hints: serde_json::Value,
    usage_count: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<GoldenRouteRow> for GoldenRoute {
    fn from(r: GoldenRouteRow) -> Self {
        GoldenRoute {
            route_id: r.route_id,
            canonical_query: r.canonical_query,
            target_collections: r.collections,
            document_id_hints: r.document_ids,
            chapter_id_hints: Vec::new(),
            routing_hints: r.routing_hints,
            usage_count: r.usage_count,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct GoldenAnswerRow {
    cluster_id: String,
    canonical_question: String,
    answer: String,
    sources: Vec<String>,
    confidence: f32,
    usage_count: i64,
}

impl From<GoldenAnswerRow> for GoldenAnswer {
    fn from(r: GoldenAnswerRow) -> Self {
        GoldenAnswer {
            cluster_id: r.cluster_id,
            canonical_question: r.canonical_question,
            answer_text: r.answer,
            sources: r.sources,
            confidence: r.confidence,
            usage_count: r.usage_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct QueryClusterRow {
    cluster_id: String,
    query_hash: String,
    query_text: String,
    frequency: i64,
}

impl From<QueryClusterRow> for QueryCluster {
    fn from(r: QueryClusterRow) -> Self {
        QueryCluster {
            cluster_id: r.cluster_id,
            query_hash: r.query_hash,
            query_text: r.query_text,
            frequency: r.frequency,
        }
    }
}
