//! `parent_documents` table access, including the forward-compatibility
//! fallback to a basic column set when quality columns haven't been
//! migrated yet.

use serde_json::Value;
use zantara_errors::CoreError;
use zantara_models::{DocumentStatus, DocumentType, ParentDocument};
use zantara_observability::log_db;

use crate::{is_missing_column_error, map_acquire_error, RelationalStoreGateway};

impl RelationalStoreGateway {
    pub async fn upsert_parent_document(&self, doc: &ParentDocument) -> Result<(), CoreError> {
        log_db!("upsert", "parent_documents", &doc.id);

        match self.upsert_parent_document_full(doc).await {
            Ok(()) => Ok(()),
            Err(CoreError::Database(e)) if is_missing_column_error(&e) => {
                self.upsert_parent_document_basic(doc).await
            }
            Err(e) => Err(e),
        }
    }

    async fn upsert_parent_document_full(&self, doc: &ParentDocument) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            INSERT INTO parent_documents
                (id, document_id, type, title, full_text, char_count, pasal_count,
                 metadata, text_fingerprint, is_incomplete, ocr_quality_score,
                 needs_reextract, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                document_id = excluded.document_id,
                type = excluded.type,
                title = excluded.title,
                full_text = excluded.full_text,
                char_count = excluded.char_count,
                pasal_count = excluded.pasal_count,
                metadata = excluded.metadata,
                text_fingerprint = excluded.text_fingerprint,
                is_incomplete = excluded.is_incomplete,
                ocr_quality_score = excluded.ocr_quality_score,
                needs_reextract = excluded.needs_reextract
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.document_id)
        .bind(doc.doc_type.as_str())
        .bind(&doc.title)
        .bind(&doc.full_text)
        .bind(doc.char_count)
        .bind(doc.pasal_count)
        .bind(&doc.metadata)
        .bind(&doc.text_fingerprint)
        .bind(doc.is_incomplete)
        .bind(doc.ocr_quality_score)
        .bind(doc.needs_reextract)
        .bind(doc.created_at)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }

    /// Fallback used on partially migrated schemas missing the quality
    /// columns (`text_fingerprint`, `ocr_quality_score`, `is_incomplete`,
    /// `needs_reextract`).
    async fn upsert_parent_document_basic(&self, doc: &ParentDocument) -> Result<(), CoreError> {
        sqlx::query(
            r#"
            INSERT INTO parent_documents
                (id, document_id, type, title, full_text, char_count, pasal_count, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                document_id = excluded.document_id,
                type = excluded.type,
                title = excluded.title,
                full_text = excluded.full_text,
                char_count = excluded.char_count,
                pasal_count = excluded.pasal_count,
                metadata = excluded.metadata
            "#,
        )
        .bind(&doc.id)
        .bind(&doc.document_id)
        .bind(doc.doc_type.as_str())
        .bind(&doc.title)
        .bind(&doc.full_text)
        .bind(doc.char_count)
        .bind(doc.pasal_count)
        .bind(&doc.metadata)
        .bind(doc.created_at)
        .execute(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(())
    }

    pub async fn find_parent_document_by_document_id(
        &self,
        document_id: &str,
    ) -> Result<Option<ParentDocument>, CoreError> {
        log_db!("select", "parent_documents", document_id);
        let row = sqlx::query_as::<_, ParentDocumentRow>(
            "SELECT id, document_id, type, title, full_text, char_count, pasal_count, metadata,
                    text_fingerprint, is_incomplete, ocr_quality_score, needs_reextract, created_at
             FROM parent_documents WHERE document_id = $1 LIMIT 1",
        )
        .bind(document_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_acquire_error)?;

        Ok(row.map(Into::into))
    }

    /// Internal ingester callback: fetch the full text of a chapter by
    /// (document id, chapter id) — chapter rows are themselves
    /// `parent_documents` rows keyed by BAB id.
    pub async fn fetch_chapter_full_text(
        &self,
        document_id: &str,
        chapter_id: &str,
    ) -> Result<Option<String>, CoreError> {
        log_db!("select", "parent_documents", chapter_id);
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT full_text FROM parent_documents WHERE document_id = $1 AND id = $2",
        )
        .bind(document_id)
        .bind(chapter_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_acquire_error)?;
        Ok(row.map(|(text,)| text))
    }
}

#[derive(sqlx::FromRow)]
struct ParentDocumentRow {
    id: String,
    document_id: String,
    #[sqlx(rename = "type")]
    doc_type: String,
    title: String,
    full_text: String,
    char_count: i32,
    pasal_count: i32,
    metadata: Value,
    text_fingerprint: Option<String>,
    is_incomplete: Option<bool>,
    ocr_quality_score: Option<f32>,
    needs_reextract: Option<bool>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ParentDocumentRow> for ParentDocument {
    fn from(row: ParentDocumentRow) -> Self {
        let doc_type = match row.doc_type.as_str() {
            "statute" => DocumentType::Statute,
            "regulation" => DocumentType::Regulation,
            "ministerial-decree" => DocumentType::MinisterialDecree,
            "court-ruling" => DocumentType::CourtRuling,
            "kbli-code" => DocumentType::KbliCode,
            "pricing" => DocumentType::Pricing,
            _ => DocumentType::Generic,
        };

        // year/number/topic/status/summary aren't dedicated columns;
        // they round-trip through `metadata`.
        let meta = row.metadata.as_object();
        let year = meta
            .and_then(|m| m.get("year"))
            .and_then(Value::as_u64)
            .map(|y| y as u16);
        let number = meta
            .and_then(|m| m.get("number"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let topic = meta
            .and_then(|m| m.get("topic"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let status = meta
            .and_then(|m| m.get("status"))
            .and_then(Value::as_str)
            .and_then(|s| match s {
                "active" => Some(DocumentStatus::Active),
                "repealed" => Some(DocumentStatus::Repealed),
                _ => None,
            });
        let summary = meta
            .and_then(|m| m.get("summary"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        ParentDocument {
            id: row.id,
            document_id: row.document_id,
            doc_type,
            title: row.title,
            year,
            number,
            topic,
            status,
            full_text: row.full_text,
            summary,
            metadata: row.metadata,
            text_fingerprint: row.text_fingerprint.unwrap_or_default(),
            ocr_quality_score: row.ocr_quality_score.unwrap_or(0.0),
            is_incomplete: row.is_incomplete.unwrap_or(false),
            needs_reextract: row.needs_reextract.unwrap_or(false),
            pasal_count: row.pasal_count,
            char_count: row.char_count,
            created_at: row.created_at,
        }
    }
}
