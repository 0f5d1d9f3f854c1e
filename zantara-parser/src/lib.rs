//! Parser & Chunker: raw bytes + filename hint → hierarchical chunks, with
//! deterministic output for identical input bytes.

pub mod chunking;
pub mod extract;
pub mod structure;

use serde_json::json;
use zantara_errors::CoreError;
use zantara_models::{HierarchicalChunk, HierarchyLevel};

use structure::{extract_ayat_numbers, parse_structure, validate_ayat_sequence};

pub struct ParsedDocument {
    pub text: String,
    pub structure: structure::DocumentStructure,
    pub chunks: Vec<HierarchicalChunk>,
}

/// Parse raw bytes into text, detect legal structure, and emit hierarchical
/// chunks. Falls back to flat semantic chunking when no BAB/Pasal structure
/// is detected.
pub fn parse_and_chunk(bytes: &[u8], filename: &str, document_id: &str) -> Result<ParsedDocument, CoreError> {
    let text = extract::extract_text(bytes, filename)?;
    let structure = parse_structure(&text);

    let chunks = if structure.is_empty() {
        flat_chunks(&text, document_id)
    } else {
        hierarchical_chunks(&structure, document_id)
    };

    Ok(ParsedDocument { text, structure, chunks })
}

fn flat_chunks(text: &str, document_id: &str) -> Vec<HierarchicalChunk> {
    chunking::semantic_split(text)
        .into_iter()
        .enumerate()
        .map(|(i, body)| HierarchicalChunk {
            logical_id: format!("{document_id}_chunk_{i}"),
            text: body,
            document_id: document_id.to_string(),
            chapter_id: None,
            article_id: None,
            hierarchy_path: format!("{document_id}/chunk_{i}"),
            hierarchy_level: HierarchyLevel::Document,
            parent_chunk_ids: Vec::new(),
            sibling_chunk_ids: Vec::new(),
            chapter_title: None,
            metadata: json!({}),
            detected_clause_numbers: Vec::new(),
            clause_sequence_valid: true,
        })
        .collect()
}

fn hierarchical_chunks(structure: &structure::DocumentStructure, document_id: &str) -> Vec<HierarchicalChunk> {
    let mut chunks = Vec::new();

    for chapter in &structure.chapters {
        let chapter_id = format!("{document_id}_BAB_{}", chapter.number);
        let sibling_ids: Vec<String> = chapter
            .articles
            .iter()
            .map(|a| format!("{document_id}_Pasal_{}", a.number))
            .collect();

        for article in &chapter.articles {
            let article_id = format!("{document_id}_Pasal_{}", article.number);
            let hierarchy_path = format!("{document_id}/BAB_{}/Pasal_{}", chapter.number, article.number);
            let ayat_numbers = extract_ayat_numbers(&article.text);
            let sequence_valid = validate_ayat_sequence(&ayat_numbers);
            let siblings: Vec<String> = sibling_ids.iter().filter(|id| **id != article_id).cloned().collect();

            if article.text.len() > chunking::OVERSIZED_ARTICLE_CHARS {
                for (sub_idx, sub_text) in chunking::semantic_split(&article.text).into_iter().enumerate() {
                    chunks.push(HierarchicalChunk {
                        logical_id: format!("{article_id}_sub_{sub_idx}"),
                        text: sub_text,
                        document_id: document_id.to_string(),
                        chapter_id: Some(chapter_id.clone()),
                        article_id: Some(article_id.clone()),
                        hierarchy_path: format!("{hierarchy_path}/sub_{sub_idx}"),
                        hierarchy_level: HierarchyLevel::Clause,
                        parent_chunk_ids: vec![chapter_id.clone(), article_id.clone()],
                        sibling_chunk_ids: siblings.clone(),
                        chapter_title: Some(chapter.title.clone()),
                        metadata: json!({ "oversized_article": true }),
                        detected_clause_numbers: ayat_numbers.clone(),
                        clause_sequence_valid: sequence_valid,
                    });
                }
            } else {
                chunks.push(HierarchicalChunk {
                    logical_id: article_id.clone(),
                    text: article.text.clone(),
                    document_id: document_id.to_string(),
                    chapter_id: Some(chapter_id.clone()),
                    article_id: Some(article_id.clone()),
                    hierarchy_path,
                    hierarchy_level: HierarchyLevel::Article,
                    parent_chunk_ids: vec![chapter_id.clone()],
                    sibling_chunk_ids: siblings,
                    chapter_title: Some(chapter.title.clone()),
                    metadata: json!({}),
                    detected_clause_numbers: ayat_numbers,
                    clause_sequence_valid: sequence_valid,
                });
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_text_produces_flat_chunks() {
        let bytes = b"Just a plain paragraph with no legal markers at all.";
        let parsed = parse_and_chunk(bytes, "notes.txt", "DOC_1").unwrap();
        assert!(parsed.structure.is_empty());
        assert!(!parsed.chunks.is_empty());
        assert!(matches!(parsed.chunks[0].hierarchy_level, HierarchyLevel::Document));
    }

    #[test]
    fn legal_text_produces_hierarchical_chunks() {
        let text = "BAB I\nKetentuan Umum\n\nPasal 1\nDalam undang-undang ini yang dimaksud dengan:\n(1) Keimigrasian adalah...\n(2) Visa adalah...\n\nPasal 2\nSetiap orang wajib memiliki dokumen keimigrasian.\n";
        let parsed = parse_and_chunk(text.as_bytes(), "uu.txt", "UU_6_2023").unwrap();
        assert_eq!(parsed.chunks.len(), 2);
        assert_eq!(parsed.chunks[0].logical_id, "UU_6_2023_Pasal_1");
        assert_eq!(parsed.chunks[0].detected_clause_numbers, vec![1, 2]);
        assert!(parsed.chunks[0].clause_sequence_valid);
    }

    #[test]
    fn identical_bytes_produce_identical_chunk_sequence() {
        let bytes = b"BAB I\nJudul\n\nPasal 1\nIsi pasal pertama yang cukup panjang untuk diuji determinisme.\n";
        let first = parse_and_chunk(bytes, "uu.txt", "UU_X").unwrap();
        let second = parse_and_chunk(bytes, "uu.txt", "UU_X").unwrap();
        let first_texts: Vec<_> = first.chunks.iter().map(|c| (&c.logical_id, &c.text, &c.hierarchy_path)).collect();
        let second_texts: Vec<_> = second.chunks.iter().map(|c| (&c.logical_id, &c.text, &c.hierarchy_path)).collect();
        assert_eq!(first_texts, second_texts);
    }
}
