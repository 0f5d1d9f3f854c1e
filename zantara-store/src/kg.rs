//! `kg_entities` / `kg_relationships` table access.

use zantara_errors::CoreError;
use zantara_models::{KgEntity, KgRelationship};
use zantara_observability::log_db;

use crate::{map_acquire_error, RelationalStoreGateway};

impl RelationalStoreGateway {
    /// Idempotent on `entity.id`.
    pub async fn upsert_kg_entity(&self, entity: &KgEntity) -> Result<(), CoreError> {
        log_db!("upsert", "kg_entities", &entity.id);
        sqlx::query(
            "INSERT INTO kg_entities (id, name, type) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET name = excluded.name, type = excluded.type",
        )
        .bind(&entity.id)
        .bind(&entity.name)
        .bind(&entity.entity_type)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }

    /// Idempotent on `(source, target, type)`.
    pub async fn upsert_kg_relationship(&self, rel: &KgRelationship) -> Result<(), CoreError> {
        log_db!("upsert", "kg_relationships", &rel.source_entity_id);
        sqlx::query(
            "INSERT INTO kg_relationships (source_entity_id, target_entity_id, relationship_type, properties)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (source_entity_id, target_entity_id, relationship_type)
             DO UPDATE SET properties = excluded.properties",
        )
        .bind(&rel.source_entity_id)
        .bind(&rel.target_entity_id)
        .bind(&rel.relationship_type)
        .bind(&rel.properties)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }

    pub async fn find_entities_by_name_like(&self, needle: &str, limit: i64) -> Result<Vec<KgEntity>, CoreError> {
        log_db!("select", "kg_entities");
        let pattern = format!("%{needle}%");
        let rows = sqlx::query_as::<_, KgEntityRow>(
            "SELECT id, name, type FROM kg_entities WHERE name ILIKE $1 LIMIT $2",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Entities ordered by relationship degree (count of relationships they
    /// participate in as either source or target). Used as the "mention
    /// count" proxy for memory enrichment, since the schema tracks no
    /// per-user mention table (see DESIGN.md Open Questions).
    pub async fn find_entities_by_relationship_degree(&self, limit: i64) -> Result<Vec<KgEntity>, CoreError> {
        log_db!("select", "kg_entities");
        let rows = sqlx::query_as::<_, KgEntityRow>(
            "SELECT e.id, e.name, e.type FROM kg_entities e
             LEFT JOIN kg_relationships r ON r.source_entity_id = e.id OR r.target_entity_id = e.id
             GROUP BY e.id, e.name, e.type
             ORDER BY COUNT(r.source_entity_id) DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_entity_by_id(&self, id: &str) -> Result<Option<KgEntity>, CoreError> {
        let row = sqlx::query_as::<_, KgEntityRow>("SELECT id, name, type FROM kg_entities WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_acquire_error)?;
        Ok(row.map(Into::into))
    }
}

#[derive(sqlx::FromRow)]
struct KgEntityRow {
    id: String,
    name: String,
    #[sqlx(rename = "type")]
    entity_type: String,
}

impl From<KgEntityRow> for KgEntity {
    fn from(r: KgEntityRow) -> Self {
        KgEntity { id: r.id, name: r.name, entity_type: r.entity_type }
    }
}
