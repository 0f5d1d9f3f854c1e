//! Semantic splitting: group paragraphs within character bounds, falling
//! back to a fixed sliding window when paragraph grouping can't make
//! progress.

const MIN_CHUNK_CHARS: usize = 200;
const MAX_CHUNK_CHARS: usize = 1500;
const FIXED_WINDOW_SIZE: usize = 1000;
const FIXED_WINDOW_OVERLAP: usize = 100;
/// Articles longer than this are recursively re-split with their own
/// metadata attached.
pub const OVERSIZED_ARTICLE_CHARS: usize = 4000;

/// Split `text` into chunks bounded by [`MIN_CHUNK_CHARS`, `MAX_CHUNK_CHARS`],
/// grouping sentences/paragraphs greedily. Falls back to a fixed sliding
/// window when paragraph grouping can't make progress (e.g. one giant
/// paragraph with no blank-line breaks).
pub fn semantic_split(text: &str) -> Vec<String> {
    let paragraphs = split_into_paragraphs(text);
    if paragraphs.is_empty() {
        return fixed_window_split(text);
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for para in paragraphs {
        if current.len() + para.len() + 1 > MAX_CHUNK_CHARS && current.len() >= MIN_CHUNK_CHARS {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(&para);

        while current.len() > MAX_CHUNK_CHARS {
            let split_at = find_sentence_break(&current, MAX_CHUNK_CHARS).unwrap_or(MAX_CHUNK_CHARS);
            let split_at = floor_to_char_boundary(&current, split_at);
            let (head, tail) = current.split_at(split_at);
            chunks.push(head.trim().to_string());
            current = tail.trim_start().to_string();
        }
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }

    if chunks.is_empty() {
        return fixed_window_split(text);
    }
    chunks
}

fn split_into_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.trim().is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Walk `idx` down to the nearest preceding char boundary in `s`, so a byte
/// offset that lands inside a multibyte character can still be used to split.
fn floor_to_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn find_sentence_break(text: &str, near: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let upper = near.min(bytes.len());
    for i in (0..upper).rev() {
        if bytes[i] == b'\n' {
            return Some(i + 1);
        }
        if (bytes[i] == b'.' || bytes[i] == b'!' || bytes[i] == b'?')
            && i + 1 < bytes.len()
            && bytes[i + 1] == b' '
        {
            return Some(i + 2);
        }
    }
    None
}

/// Fixed-window fallback: 1000-char windows with a 100-char overlap.
pub fn fixed_window_split(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        let end = (start + FIXED_WINDOW_SIZE).min(bytes.len());
        let break_point = if end < bytes.len() {
            find_sentence_break(text, end).unwrap_or(end)
        } else {
            end
        };

        if let Ok(slice) = std::str::from_utf8(&bytes[start..break_point]) {
            let trimmed = slice.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }
        }

        if break_point >= bytes.len() {
            break;
        }
        start = break_point.saturating_sub(FIXED_WINDOW_OVERLAP);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_by_paragraph_within_bounds() {
        let text = "Para one sentence.\n\nPara two sentence.\n\nPara three sentence.";
        let chunks = semantic_split(text);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(c.len() <= MAX_CHUNK_CHARS);
        }
    }

    #[test]
    fn falls_back_to_fixed_window_on_single_giant_paragraph() {
        let text = "x".repeat(5000);
        let chunks = semantic_split(&text);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn fixed_window_respects_overlap() {
        let text = "a".repeat(2500);
        let chunks = fixed_window_split(&text);
        assert!(chunks.len() >= 3);
    }
}
