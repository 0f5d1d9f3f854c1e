//! Closed error taxonomy for the core engine.
//!
//! A flat `thiserror` enum with `#[from]` conversions for the handful of
//! infrastructure errors that cross into it, but no `actix_web::ResponseError`
//! impl — HTTP transport is an out-of-scope collaborator for this core.

use uuid::Uuid;

/// The closed set of error kinds the core can raise. `AuthRequired`
/// and `Forbidden` originate in the surrounding auth layer; the core is
/// oblivious to them but still carries the variants so callers can map them
/// through the same `ErrorShape`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("input invalid: {0}")]
    InputInvalid(String),

    #[error("authentication required")]
    AuthRequired,

    #[error("forbidden")]
    Forbidden,

    #[error("collection missing: {0}")]
    CollectionMissing(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("connection pool exhausted")]
    PoolExhausted,

    #[error("embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("llm provider unavailable: {0}")]
    LLMUnavailable(String),

    #[error("transport error: {0}")]
    TransportError(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out")]
    Timeout,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("quality too low: {0}")]
    QualityTooLow(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Stable machine-readable code, used in `ErrorShape::error_code`.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InputInvalid(_) => "input_invalid",
            CoreError::AuthRequired => "auth_required",
            CoreError::Forbidden => "forbidden",
            CoreError::CollectionMissing(_) => "collection_missing",
            CoreError::DimensionMismatch { .. } => "dimension_mismatch",
            CoreError::PoolExhausted => "pool_exhausted",
            CoreError::EmbeddingUnavailable(_) => "embedding_unavailable",
            CoreError::LLMUnavailable(_) => "llm_unavailable",
            CoreError::TransportError(_) => "transport_error",
            CoreError::Cancelled => "cancelled",
            CoreError::Timeout => "timeout",
            CoreError::Conflict(_) => "conflict",
            CoreError::NotFound(_) => "not_found",
            CoreError::QualityTooLow(_) => "quality_too_low",
            CoreError::Database(_) => "database_error",
            CoreError::Serialization(_) => "serialization_error",
            CoreError::Internal(_) => "internal_error",
        }
    }

    /// Whether this kind degrades gracefully on the query path (retrieval,
    /// memory, and KG failures fall back instead of aborting the whole
    /// answer).
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            CoreError::CollectionMissing(_)
                | CoreError::EmbeddingUnavailable(_)
                | CoreError::TransportError(_)
                | CoreError::Timeout
                | CoreError::NotFound(_)
        )
    }

    /// Localized fallback message for terminal failures, keyed by a
    /// 2-letter language code. Falls back to English for unsupported codes.
    pub fn localized_fallback(language: &str) -> &'static str {
        match language {
            "id" => "Maaf, saya tidak dapat memproses permintaan Anda saat ini. Silakan coba lagi.",
            "it" => "Siamo spiacenti, al momento non è possibile elaborare la richiesta. Riprova più tardi.",
            _ => "Sorry, I couldn't process your request right now. Please try again shortly.",
        }
    }

    /// Build the user-visible `{error_code, message, request_id}` shape.
    pub fn into_shape(self, request_id: Uuid) -> ErrorShape {
        ErrorShape {
            error_code: self.code().to_string(),
            message: self.to_string(),
            request_id,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ErrorShape {
    pub error_code: String,
    pub message: String,
    pub request_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_missing_degrades() {
        assert!(CoreError::CollectionMissing("x".into()).is_degradable());
        assert!(!CoreError::Forbidden.is_degradable());
    }

    #[test]
    fn localized_fallback_has_all_three_languages() {
        assert_ne!(CoreError::localized_fallback("en"), CoreError::localized_fallback("id"));
        assert_ne!(CoreError::localized_fallback("it"), CoreError::localized_fallback("id"));
    }

    #[test]
    fn error_shape_carries_code() {
        let shape = CoreError::NotFound("doc-1".into()).into_shape(Uuid::nil());
        assert_eq!(shape.error_code, "not_found");
    }
}
