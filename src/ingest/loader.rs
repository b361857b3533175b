//! Document Loaders
//!
//! Text extraction for the supported source formats. Every loader returns
//! pages of plain text; unpaged formats yield a single page.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::types::{BuddyError, Result};

/// Supported source document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Text,
    Markdown,
    Json,
    Pdf,
}

/// Detect the format from the file extension; `None` means "skip this file"
pub fn detect_format(path: &Path) -> Option<SourceFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" => Some(SourceFormat::Text),
        "md" | "markdown" => Some(SourceFormat::Markdown),
        "json" => Some(SourceFormat::Json),
        "pdf" => Some(SourceFormat::Pdf),
        _ => None,
    }
}

/// Extract pages of plain text from a source file
pub fn load_file(path: &Path, format: SourceFormat) -> Result<Vec<String>> {
    match format {
        SourceFormat::Text | SourceFormat::Markdown => {
            let contents = fs::read_to_string(path)
                .map_err(|e| BuddyError::ingest(path.display().to_string(), e.to_string()))?;
            Ok(vec![contents])
        }
        SourceFormat::Json => {
            let contents = fs::read_to_string(path)
                .map_err(|e| BuddyError::ingest(path.display().to_string(), e.to_string()))?;
            let value: Value = serde_json::from_str(&contents)
                .map_err(|e| BuddyError::ingest(path.display().to_string(), e.to_string()))?;
            Ok(vec![flatten_json_text(&value)])
        }
        SourceFormat::Pdf => {
            let text = pdf_extract::extract_text(path)
                .map_err(|e| BuddyError::ingest(path.display().to_string(), e.to_string()))?;
            // pdf-extract emits form feeds at page boundaries
            let pages: Vec<String> = text
                .split('\u{c}')
                .map(|page| page.trim().to_string())
                .filter(|page| !page.is_empty())
                .collect();
            Ok(pages)
        }
    }
}

/// Collect every string leaf of a JSON document, depth-first, joined by
/// newlines. Keys of objects are included so Q&A-style documents keep their
/// question text.
fn flatten_json_text(value: &Value) -> String {
    let mut parts = Vec::new();
    collect_text(value, &mut parts);
    parts.join("\n")
}

fn collect_text(value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if !s.trim().is_empty() {
                parts.push(s.trim().to_string());
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text(item, parts);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if item.is_string() || item.is_array() || item.is_object() {
                    if !key.trim().is_empty() && !item.is_string() {
                        parts.push(format!("{}:", key));
                    }
                    collect_text(item, parts);
                }
            }
        }
        _ => {}
    }
}
