//! `user_memory` table access.

use uuid::Uuid;
use zantara_errors::CoreError;
use zantara_models::UserMemory;
use zantara_observability::log_db;

use crate::{map_acquire_error, RelationalStoreGateway};

impl RelationalStoreGateway {
    pub async fn find_user_memory(&self, user_id: Uuid) -> Result<Option<UserMemory>, CoreError> {
        log_db!("select", "user_memory", &user_id);
        let row = sqlx::query_as::<_, UserMemoryRow>(
            "SELECT user_id, profile_facts, summary, counters, updated_at
             FROM user_memory WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(row.map(Into::into))
    }

    pub async fn upsert_user_memory(&self, memory: &UserMemory) -> Result<(), CoreError> {
        log_db!("upsert", "user_memory", &memory.user_id);
        sqlx::query(
            "INSERT INTO user_memory (user_id, profile_facts, summary, counters, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (user_id) DO UPDATE SET
                profile_facts = excluded.profile_facts,
                summary = excluded.summary,
                counters = excluded.counters,
                updated_at = excluded.updated_at",
        )
        .bind(memory.user_id)
        .bind(&memory.profile_facts)
        .bind(&memory.summary)
        .bind(serde_json::to_value(memory.counters).map_err(CoreError::Serialization)?)
        .bind(memory.updated_at)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct UserMemoryRow {
    user_id: Uuid,
    profile_facts: Vec<String>,
    summary: String,
    counters: serde_json::Value,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<UserMemoryRow> for UserMemory {
    fn from(r: UserMemoryRow) -> Self {
        UserMemory {
            user_id: r.user_id,
            profile_facts: r.profile_facts,
            summary: r.summary,
            counters: serde_json::from_value(r.counters).unwrap_or_default(),
            updated_at: r.updated_at,
        }
    }
}
