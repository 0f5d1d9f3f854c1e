//! Vector Store Gateway: collection-scoped HTTP-JSON client over Qdrant,
//! built on raw HTTP rather than the `qdrant-client` crate so the wire
//! shapes are fully explicit and controlled here.

pub mod filter;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;
use zantara_errors::CoreError;
use zantara_observability::log_external_call;

pub use filter::{Filter, FilterCondition};

const MAX_PAYLOAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: Uuid,
    pub score: f32,
    pub payload: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    pub vectors_count: u64,
    pub indexed_vectors_count: u64,
}

#[derive(Clone)]
pub struct VectorStoreGateway {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl VectorStoreGateway {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    fn collection_url(&self, name: &str) -> String {
        format!("{}/collections/{}", self.base_url, name)
    }

    fn with_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    pub async fn ensure_collection(&self, name: &str, dim: usize) -> Result<(), CoreError> {
        let url = self.collection_url(name);
        log_external_call!("qdrant", &url);

        let existing = self
            .with_auth(self.http.get(&url))
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        if existing.status().is_success() {
            return Ok(());
        }

        let create_request = serde_json::json!({
            "vectors": { "size": dim, "distance": "Cosine" }
        });
        let response = self
            .with_auth(self.http.put(&url))
            .json(&create_request)
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        if response.status().is_success() {
            info!(collection = name, dim, "collection ensured");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(CoreError::TransportError(format!("ensure_collection failed: {body}")))
        }
    }

    /// Upsert points, enforcing the gateway invariants: UUID ids (by type),
    /// vector length equal to `dim`, payload size ≤ 64 KiB.
    pub async fn upsert(&self, collection: &str, dim: usize, points: Vec<Point>) -> Result<(), CoreError> {
        for p in &points {
            if p.vector.len() != dim {
                return Err(CoreError::DimensionMismatch { expected: dim, actual: p.vector.len() });
            }
            let payload_bytes = serde_json::to_vec(&p.payload).map_err(CoreError::Serialization)?;
            if payload_bytes.len() > MAX_PAYLOAD_BYTES {
                return Err(CoreError::InputInvalid(format!(
                    "payload for point {} exceeds {} bytes",
                    p.id, MAX_PAYLOAD_BYTES
                )));
            }
        }

        let url = format!("{}/points", self.collection_url(collection));
        let body = serde_json::json!({ "points": points.iter().map(point_to_wire).collect::<Vec<_>>() });

        let response = self
            .with_auth(self.http.put(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else if response.status().as_u16() == 404 {
            Err(CoreError::CollectionMissing(collection.to_string()))
        } else {
            let text = response.text().await.unwrap_or_default();
            warn!(collection, "upsert failed: {text}");
            Err(CoreError::TransportError(format!("upsert failed: {text}")))
        }
    }

    pub async fn search(
        &self,
        collection: &str,
        query_vector: &[f32],
        filter: Option<&Filter>,
        limit: usize,
    ) -> Result<Vec<SearchHit>, CoreError> {
        let url = format!("{}/points/search", self.collection_url(collection));
        let mut body = serde_json::json!({
            "vector": query_vector,
            "limit": limit,
            "with_payload": true,
            "with_vector": false,
        });
        if let Some(f) = filter {
            if let Some(json_filter) = f.to_qdrant_json() {
                body["filter"] = json_filter;
            }
        }

        let response = self
            .with_auth(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(CoreError::CollectionMissing(collection.to_string()));
        }
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CoreError::TransportError(format!("search failed: {text}")));
        }

        let parsed: QdrantSearchResponse = response
            .json()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        Ok(parsed
            .result
            .into_iter()
            .filter_map(|r| {
                Uuid::parse_str(&r.id).ok().map(|id| SearchHit {
                    id,
                    score: r.score,
                    payload: r.payload.unwrap_or_default(),
                })
            })
            .collect())
    }

    pub async fn delete(&self, collection: &str, ids: &[Uuid]) -> Result<(), CoreError> {
        let url = format!("{}/points/delete", self.collection_url(collection));
        let body = serde_json::json!({ "points": ids.iter().map(|id| id.to_string()).collect::<Vec<_>>() });
        let response = self
            .with_auth(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CoreError::TransportError(format!("delete failed: {text}")))
        }
    }

    pub async fn stats(&self, collection: &str) -> Result<CollectionStats, CoreError> {
        let url = self.collection_url(collection);
        let response = self
            .with_auth(self.http.get(&url))
            .send()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(CoreError::CollectionMissing(collection.to_string()));
        }

        let info: QdrantCollectionInfo = response
            .json()
            .await
            .map_err(|e| CoreError::TransportError(e.to_string()))?;

        Ok(CollectionStats {
            vectors_count: info.result.vectors_count.unwrap_or(0),
            indexed_vectors_count: info.result.indexed_vectors_count.unwrap_or(0),
        })
    }
}

fn point_to_wire(p: &Point) -> Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "vector": p.vector,
        "payload": p.payload,
    })
}

#[derive(Debug, Deserialize)]
struct QdrantSearchResponse {
    result: Vec<QdrantSearchResult>,
}

#[derive(Debug, Deserialize)]
struct QdrantSearchResult {
    id: String,
    score: f32,
    payload: Option<HashMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct QdrantCollectionInfo {
    result: QdrantCollectionInfoInner,
}

#[derive(Debug, Deserialize)]
struct QdrantCollectionInfoInner {
    vectors_count: Option<u64>,
    indexed_vectors_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_rejects_dimension_mismatch() {
        let gateway = VectorStoreGateway::new("http://localhost:6333", None);
        let point = Point {
            id: Uuid::new_v4(),
            vector: vec![0.1, 0.2],
            payload: HashMap::new(),
        };
        let err = gateway.upsert("legal_unified", 1536, vec![point]).await.unwrap_err();
        assert!(matches!(err, CoreError::DimensionMismatch { expected: 1536, actual: 2 }));
    }

    #[tokio::test]
    async fn upsert_rejects_oversized_payload() {
        let gateway = VectorStoreGateway::new("http://localhost:6333", None);
        let mut payload = HashMap::new();
        payload.insert("text".to_string(), Value::String("x".repeat(MAX_PAYLOAD_BYTES + 10)));
        let point = Point { id: Uuid::new_v4(), vector: vec![0.0; 4], payload };
        let err = gateway.upsert("legal_unified", 4, vec![point]).await.unwrap_err();
        assert!(matches!(err, CoreError::InputInvalid(_)));
    }

    #[test]
    fn filter_renders_all_three_condition_kinds() {
        let filter = Filter::new()
            .with_equals("tier", Value::String("A".into()))
            .with_in_set("tier", vec![Value::String("A".into()), Value::String("B".into())])
            .with_range("year", Some(2000.0), Some(2024.0));
        let json = filter.to_qdrant_json().unwrap();
        assert_eq!(json["must"].as_array().unwrap().len(), 3);
    }
}
