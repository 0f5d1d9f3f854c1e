//! `conversation_ratings` table access plus a minimal per-turn analytics
//! log the answer orchestrator writes to at the end of `process_query`.

use uuid::Uuid;
use zantara_errors::CoreError;
use zantara_models::{ConversationRating, FeedbackType, QueryAnalyticsRecord};
use zantara_observability::log_db;

use crate::{map_acquire_error, RelationalStoreGateway};

/// Ratings are on a 1–5 scale; anything outside that range is a validation
/// error, not a value worth persisting.
const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

impl RelationalStoreGateway {
    pub async fn insert_conversation_rating(&self, rating: &ConversationRating) -> Result<(), CoreError> {
        if !RATING_RANGE.contains(&rating.rating) {
            return Err(CoreError::InputInvalid(format!(
                "rating must be between {} and {}, got {}",
                RATING_RANGE.start(),
                RATING_RANGE.end(),
                rating.rating
            )));
        }
        log_db!("insert", "conversation_ratings", &rating.rating_id);
        sqlx::query(
            "INSERT INTO conversation_ratings
                (rating_id, session_id, user_id, rating, feedback_type, feedback_text, turn_count, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(rating.rating_id)
        .bind(rating.session_id)
        .bind(rating.user_id)
        .bind(rating.rating as i16)
        .bind(rating.feedback_type.map(feedback_type_as_str))
        .bind(&rating.feedback_text)
        .bind(rating.turn_count)
        .bind(rating.created_at)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }

    pub async fn find_conversation_rating(&self, rating_id: Uuid) -> Result<Option<ConversationRating>, CoreError> {
        log_db!("select", "conversation_ratings", &rating_id);
        let row = sqlx::query_as::<_, ConversationRatingRow>(
            "SELECT rating_id, session_id, user_id, rating, feedback_type, feedback_text, turn_count, created_at
             FROM conversation_ratings WHERE rating_id = $1",
        )
        .bind(rating_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(row.map(Into::into))
    }

    pub async fn insert_query_analytics(&self, record: &QueryAnalyticsRecord) -> Result<(), CoreError> {
        log_db!("insert", "query_analytics", &record.session_id);
        sqlx::query(
            "INSERT INTO query_analytics
                (session_id, user_id, query, mode, model_used, latency_ms, degraded_subsystems, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.session_id)
        .bind(record.user_id)
        .bind(&record.query)
        .bind(&record.mode)
        .bind(&record.model_used)
        .bind(record.latency_ms as i64)
        .bind(&record.degraded_subsystems)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRatingRow {
    rating_id: Uuid,
    session_id: Uuid,
    user_id: Option<Uuid>,
    rating: i16,
    feedback_type: Option<String>,
    feedback_text: Option<String>,
    turn_count: Option<i32>,
    created_at: chrono::DateTime<chrono::Utc>,
}

fn feedback_type_as_str(kind: FeedbackType) -> &'static str {
    match kind {
        FeedbackType::Positive => "positive",
        FeedbackType::Negative => "negative",
        FeedbackType::Issue => "issue",
    }
}

fn feedback_type_from_str(s: &str) -> Option<FeedbackType> {
    match s {
        "positive" => Some(FeedbackType::Positive),
        "negative" => Some(FeedbackType::Negative),
        "issue" => Some(FeedbackType::Issue),
        _ => None,
    }
}

impl From<ConversationRatingRow> for ConversationRating {
    fn from(r: ConversationRatingRow) -> Self {
        ConversationRating {
            rating_id: r.rating_id,
            session_id: r.session_id,
            user_id: r.user_id,
            rating: r.rating as u8,
            feedback_type: r.feedback_type.as_deref().and_then(feedback_type_from_str),
            feedback_text: r.feedback_text,
            turn_count: r.turn_count,
            created_at: r.created_at,
        }
    }
}
