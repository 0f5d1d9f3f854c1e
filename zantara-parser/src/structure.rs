//! Indonesian legal document structure detection:
//! BAB (Chapter) → Pasal (Article) → Ayat (Clause).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BAB_RE: Regex = Regex::new(r"(?m)^\s*BAB\s+([IVXLCDM]+)\s*\n?(.*)$").unwrap();
    static ref PASAL_RE: Regex = Regex::new(r"(?m)^\s*Pasal\s+(\d+[A-Za-z]?)\s*$").unwrap();
    static ref AYAT_RE: Regex = Regex::new(r"\(?(\d+)\)").unwrap();
}

#[derive(Debug, Clone)]
pub struct Article {
    pub number: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Chapter {
    pub number: String,
    pub title: String,
    pub articles: Vec<Article>,
    pub full_text: String,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentStructure {
    pub chapters: Vec<Chapter>,
}

impl DocumentStructure {
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

/// True if this body of text contains at least one `Pasal <n>` marker —
/// used by the metadata extractor's is-legal-document heuristic.
pub fn has_article_marker(text: &str) -> bool {
    PASAL_RE.is_match(text)
}

/// Parse `BAB <roman>` / `Pasal <n>` structure out of raw document text.
/// Text without any BAB markers degrades to a single synthetic chapter
/// containing all detected articles (or none, if no Pasal markers fire
/// either — callers fall back to flat chunking in that case).
pub fn parse_structure(text: &str) -> DocumentStructure {
    let bab_starts: Vec<(usize, String, String)> = BAB_RE
        .captures_iter(text)
        .map(|c| {
            let m = c.get(0).unwrap();
            (m.start(), c[1].to_string(), c.get(2).map(|t| t.as_str().trim().to_string()).unwrap_or_default())
        })
        .collect();

    if bab_starts.is_empty() {
        let articles = parse_articles(text);
        if articles.is_empty() {
            return DocumentStructure::default();
        }
        return DocumentStructure {
            chapters: vec![Chapter {
                number: "1".to_string(),
                title: String::new(),
                full_text: text.to_string(),
                articles,
            }],
        };
    }

    let mut chapters = Vec::new();
    for (i, (start, number, title)) in bab_starts.iter().enumerate() {
        let end = bab_starts.get(i + 1).map(|(s, _, _)| *s).unwrap_or(text.len());
        let body = &text[*start..end];
        chapters.push(Chapter {
            number: number.clone(),
            title: title.clone(),
            full_text: body.to_string(),
            articles: parse_articles(body),
        });
    }
    DocumentStructure { chapters }
}

fn parse_articles(text: &str) -> Vec<Article> {
    let starts: Vec<(usize, String)> = PASAL_RE
        .captures_iter(text)
        .map(|c| (c.get(0).unwrap().start(), c[1].to_string()))
        .collect();

    let mut articles = Vec::with_capacity(starts.len());
    for (i, (start, number)) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map(|(s, _)| *s).unwrap_or(text.len());
        articles.push(Article {
            number: number.clone(),
            text: text[*start..end].trim().to_string(),
        });
    }
    articles
}

/// Ayat (clause) numbers detected inside an article body, e.g. `(1)`, `(2)`.
pub fn extract_ayat_numbers(article_text: &str) -> Vec<u32> {
    AYAT_RE
        .captures_iter(article_text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .collect()
}

/// True if detected clause numbers form a contiguous 1..=N sequence with no
/// gaps or repeats (ignoring duplicates from incidental numeric mentions
/// elsewhere in the text is out of scope — this checks the first-seen
/// ascending run).
pub fn validate_ayat_sequence(numbers: &[u32]) -> bool {
    if numbers.is_empty() {
        return true;
    }
    let mut expected = 1u32;
    for &n in numbers {
        if n == expected {
            expected += 1;
        } else if n < expected {
            continue; // repeated reference to an earlier ayat, e.g. "sebagaimana dimaksud pada ayat (1)"
        } else {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bab_and_pasal() {
        let text = "BAB I\nKetentuan Umum\n\nPasal 1\nDalam undang-undang ini...\n\nPasal 2\nSetiap orang wajib...\n\nBAB II\nHak dan Kewajiban\n\nPasal 3\nSetiap warga negara...\n";
        let structure = parse_structure(text);
        assert_eq!(structure.chapters.len(), 2);
        assert_eq!(structure.chapters[0].articles.len(), 2);
        assert_eq!(structure.chapters[1].articles.len(), 1);
        assert_eq!(structure.chapters[1].number, "II");
    }

    #[test]
    fn flat_text_with_no_bab_falls_back_to_single_chapter() {
        let text = "Pasal 1\nIsi pasal pertama.\n\nPasal 2\nIsi pasal kedua.\n";
        let structure = parse_structure(text);
        assert_eq!(structure.chapters.len(), 1);
        assert_eq!(structure.chapters[0].articles.len(), 2);
    }

    #[test]
    fn no_structure_at_all_is_empty() {
        let structure = parse_structure("just some plain prose with no markers");
        assert!(structure.is_empty());
    }

    #[test]
    fn ayat_sequence_detects_gap() {
        assert!(validate_ayat_sequence(&[1, 2, 3]));
        assert!(!validate_ayat_sequence(&[1, 3]));
        assert!(validate_ayat_sequence(&[1, 2, 1, 2])); // back-references allowed
    }

    #[test]
    fn detects_article_marker() {
        assert!(has_article_marker("Pasal 1\nIsi."));
        assert!(!has_article_marker("no markers here"));
    }
}
