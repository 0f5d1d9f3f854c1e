//! Raw bytes + filename hint → text.

use zantara_errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Markdown,
    Json,
    JsonLines,
    Text,
}

impl SourceFormat {
    pub fn from_filename(filename: &str) -> Self {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            SourceFormat::Pdf
        } else if lower.ends_with(".md") || lower.ends_with(".markdown") {
            SourceFormat::Markdown
        } else if lower.ends_with(".jsonl") || lower.ends_with(".ndjson") {
            SourceFormat::JsonLines
        } else if lower.ends_with(".json") {
            SourceFormat::Json
        } else {
            SourceFormat::Text
        }
    }
}

/// Image placeholder marker PDF extraction sometimes leaves behind.
const IMAGE_MARKER: &str = "[image]";

pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, CoreError> {
    let format = SourceFormat::from_filename(filename);
    let raw = match format {
        SourceFormat::Pdf => extract_pdf(bytes)?,
        SourceFormat::Markdown => extract_markdown(bytes)?,
        SourceFormat::Json => extract_json(bytes)?,
        SourceFormat::JsonLines => extract_jsonl(bytes)?,
        SourceFormat::Text => String::from_utf8_lossy(bytes).into_owned(),
    };
    Ok(strip_image_markers(&raw))
}

fn extract_pdf(bytes: &[u8]) -> Result<String, CoreError> {
    // Page-by-page extraction; pdf_extract concatenates pages with form feeds.
    pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| CoreError::InputInvalid(format!("failed to extract PDF text: {e}")))
}

fn extract_markdown(bytes: &[u8]) -> Result<String, CoreError> {
    let text = String::from_utf8_lossy(bytes);
    let arena = comrak::Arena::new();
    let root = comrak::parse_document(&arena, &text, &comrak::ComrakOptions::default());
    let mut out = String::new();
    collect_text(root, &mut out);
    Ok(out)
}

fn collect_text<'a>(node: &'a comrak::nodes::AstNode<'a>, out: &mut String) {
    use comrak::nodes::NodeValue;
    match &node.data.borrow().value {
        NodeValue::Text(t) => out.push_str(t),
        NodeValue::Code(c) => out.push_str(&c.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push('\n'),
        NodeValue::Paragraph | NodeValue::Heading(_) => {}
        _ => {}
    }
    for child in node.children() {
        collect_text(child, out);
    }
    if matches!(node.data.borrow().value, NodeValue::Paragraph | NodeValue::Heading(_)) {
        out.push('\n');
    }
}

fn extract_json(bytes: &[u8]) -> Result<String, CoreError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| CoreError::InputInvalid(e.to_string()))?;
    Ok(json_value_to_text(&value))
}

fn extract_jsonl(bytes: &[u8]) -> Result<String, CoreError> {
    let text = String::from_utf8_lossy(bytes);
    let mut out = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value =
            serde_json::from_str(line).map_err(|e| CoreError::InputInvalid(e.to_string()))?;
        out.push_str(&json_value_to_text(&value));
        out.push('\n');
    }
    Ok(out)
}

fn json_value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .values()
            .map(json_value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        serde_json::Value::Array(arr) => arr.iter().map(json_value_to_text).collect::<Vec<_>>().join("\n"),
        other => other.to_string(),
    }
}

fn strip_image_markers(text: &str) -> String {
    text.replace(IMAGE_MARKER, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(SourceFormat::from_filename("uu_6_2023.pdf"), SourceFormat::Pdf);
        assert_eq!(SourceFormat::from_filename("notes.md"), SourceFormat::Markdown);
        assert_eq!(SourceFormat::from_filename("data.jsonl"), SourceFormat::JsonLines);
        assert_eq!(SourceFormat::from_filename("plain.txt"), SourceFormat::Text);
    }

    #[test]
    fn strips_image_markers() {
        let input = "Pasal 1\n[image]\nTeks berikutnya";
        assert_eq!(strip_image_markers(input), "Pasal 1\n\nTeks berikutnya");
    }
}
