//! Structured Response Parsing
//!
//! Two-stage parser for model responses that are supposed to be structured
//! data. Stage one is a strict JSON parse. Stage two is a permissive repair
//! pass that handles the formats models actually emit:
//!
//! - Markdown code fence wrapping (```json ... ```)
//! - Python-style literals (single-quoted strings, True/False/None)
//! - Trailing commas and unbalanced brackets
//! - JSON embedded in explanatory text
//!
//! Both stages failing produces a typed `StructuredParseError`, never a
//! silent `None`; callers map it into their own error taxonomy.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

static PYTHON_TRUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bTrue\b").expect("valid regex"));
static PYTHON_FALSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bFalse\b").expect("valid regex"));
static PYTHON_NONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bNone\b").expect("valid regex"));

/// Raised when a response survives neither the strict nor the permissive
/// parse stage.
#[derive(Debug, thiserror::Error)]
#[error("no parseable structure in response: {preview:?}")]
pub struct StructuredParseError {
    /// First 200 characters of the offending response
    pub preview: String,
}

impl StructuredParseError {
    fn new(raw: &str) -> Self {
        Self {
            preview: raw.chars().take(200).collect(),
        }
    }
}

/// Parse a model response as structured data.
///
/// Tries strict JSON first, then the permissive repair pass.
pub fn parse_structured(raw: &str) -> Result<Value, StructuredParseError> {
    let cleaned = strip_code_fences(raw.trim().trim_start_matches('\u{feff}'));

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(value);
    }

    debug!("strict parse failed, attempting repair");

    // Python-style literal (the ast.literal_eval shape: single quotes,
    // True/False/None)
    let normalized = pythonish_to_json(&cleaned);
    if let Ok(value) = serde_json::from_str::<Value>(&normalized) {
        return Ok(value);
    }

    // Trailing commas / unbalanced brackets on top of the normalization
    let repaired = balance_brackets(&fix_trailing_commas(&normalized));
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        return Ok(value);
    }

    // Structure embedded in explanatory prose
    if let Some(embedded) = extract_embedded(&normalized)
        && let Ok(value) = serde_json::from_str::<Value>(&embedded)
    {
        return Ok(value);
    }

    Err(StructuredParseError::new(raw))
}

/// Parse a model or search response as a flat list of strings.
///
/// Accepts an array of strings, an array of objects (joining their snippet
/// or title fields), or an object wrapping a `results` array.
pub fn parse_string_list(raw: &str) -> Result<Vec<String>, StructuredParseError> {
    let value = parse_structured(raw)?;
    flatten_string_list(&value).ok_or_else(|| StructuredParseError::new(raw))
}

fn flatten_string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(items.iter().map(item_text).collect()),
        Value::Object(map) => map.get("results").and_then(flatten_string_list),
        _ => None,
    }
}

fn item_text(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let mut parts = Vec::new();
            for key in ["title", "snippet", "text", "link", "url"] {
                if let Some(Value::String(s)) = map.get(key)
                    && !s.is_empty()
                {
                    parts.push(s.as_str());
                }
            }
            if parts.is_empty() {
                item.to_string()
            } else {
                parts.join(" - ")
            }
        }
        other => other.to_string(),
    }
}

// =============================================================================
// Repair Passes
// =============================================================================

/// Strip markdown code fences
fn strip_code_fences(s: &str) -> String {
    let mut result = s.to_string();

    if result.starts_with("```")
        && let Some(first_newline) = result.find('\n')
    {
        result = result[first_newline + 1..].to_string();
    }

    if result.ends_with("```") {
        result = result[..result.len() - 3].trim_end().to_string();
    }

    result.trim().to_string()
}

/// Convert Python literal syntax to JSON: single-quoted strings become
/// double-quoted (with embedded double quotes escaped), and the keywords
/// True/False/None outside strings become their JSON spellings.
fn pythonish_to_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut bare = String::new();
    let mut chars = s.chars();
    let mut in_double = false;
    let mut in_single = false;

    let flush_bare = |bare: &mut String, out: &mut String| {
        if bare.is_empty() {
            return;
        }
        let replaced = PYTHON_TRUE.replace_all(bare, "true");
        let replaced = PYTHON_FALSE.replace_all(&replaced, "false");
        let replaced = PYTHON_NONE.replace_all(&replaced, "null");
        out.push_str(&replaced);
        bare.clear();
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_single || in_double => {
                match chars.next() {
                    // \' in a single-quoted string is a plain apostrophe in JSON
                    Some('\'') if in_single => out.push('\''),
                    Some(next) => {
                        out.push('\\');
                        out.push(next);
                    }
                    None => out.push('\\'),
                }
            }
            '"' if in_single => out.push_str("\\\""),
            '"' => {
                flush_bare(&mut bare, &mut out);
                in_double = !in_double;
                out.push('"');
            }
            '\'' if !in_double => {
                flush_bare(&mut bare, &mut out);
                in_single = !in_single;
                out.push('"');
            }
            _ if in_single || in_double => out.push(ch),
            _ => bare.push(ch),
        }
    }
    flush_bare(&mut bare, &mut out);

    out
}

/// Drop trailing commas before ] or }
fn fix_trailing_commas(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];

        if ch == ',' {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && (chars[j] == ']' || chars[j] == '}') {
                i += 1;
                continue;
            }
        }

        result.push(ch);
        i += 1;
    }

    result
}

/// Balance brackets by appending missing closers
fn balance_brackets(s: &str) -> String {
    let mut result = s.to_string();

    let mut brace_count = 0;
    let mut bracket_count = 0;
    let mut in_string = false;
    let mut escape = false;

    for ch in result.chars() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' if !in_string => brace_count += 1,
            '}' if !in_string => brace_count -= 1,
            '[' if !in_string => bracket_count += 1,
            ']' if !in_string => bracket_count -= 1,
            _ => {}
        }
    }

    if in_string {
        result.push('"');
    }
    for _ in 0..bracket_count {
        result.push(']');
    }
    for _ in 0..brace_count {
        result.push('}');
    }

    result
}

/// Extract the first balanced object or array from mixed content
fn extract_embedded(s: &str) -> Option<String> {
    let start = s.find(['{', '['])?;
    let open = s[start..].chars().next()?;
    let close = if open == '{' { '}' } else { ']' };

    let mut depth = 0;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(s[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json() {
        let value = parse_structured(r#"{"questions": ["a", "b"]}"#).unwrap();
        assert_eq!(value, json!({"questions": ["a", "b"]}));
    }

    #[test]
    fn test_code_fenced_json() {
        let raw = "```json\n{\"questions\": [\"a\"]}\n```";
        let value = parse_structured(raw).unwrap();
        assert_eq!(value, json!({"questions": ["a"]}));
    }

    #[test]
    fn test_python_literal_list() {
        let value = parse_structured("['first result', 'second result']").unwrap();
        assert_eq!(value, json!(["first result", "second result"]));
    }

    #[test]
    fn test_python_literal_dict_with_constants() {
        let value = parse_structured("{'ok': True, 'missing': None, 'bad': False}").unwrap();
        assert_eq!(value, json!({"ok": true, "missing": null, "bad": false}));
    }

    #[test]
    fn test_python_escaped_apostrophe() {
        let value = parse_structured(r"['it\'s fine']").unwrap();
        assert_eq!(value, json!(["it's fine"]));
    }

    #[test]
    fn test_trailing_comma() {
        let value = parse_structured(r#"{"questions": ["a", "b",]}"#).unwrap();
        assert_eq!(value, json!({"questions": ["a", "b"]}));
    }

    #[test]
    fn test_embedded_in_prose() {
        let raw = "Here are the results:\n{\"questions\": [\"a\"]}\nHope that helps!";
        let value = parse_structured(raw).unwrap();
        assert_eq!(value, json!({"questions": ["a"]}));
    }

    #[test]
    fn test_unparseable_is_typed_error() {
        let err = parse_structured("not structured at all").unwrap_err();
        assert!(err.preview.contains("not structured"));
    }

    #[test]
    fn test_string_list_from_strings() {
        let list = parse_string_list(r#"["a", "b"]"#).unwrap();
        assert_eq!(list, vec!["a", "b"]);
    }

    #[test]
    fn test_string_list_from_objects() {
        let raw = r#"[{"title": "Deadlines", "snippet": "June 1 for fall"}]"#;
        let list = parse_string_list(raw).unwrap();
        assert_eq!(list, vec!["Deadlines - June 1 for fall"]);
    }

    #[test]
    fn test_string_list_from_results_wrapper() {
        let raw = r#"{"results": ["only one"]}"#;
        let list = parse_string_list(raw).unwrap();
        assert_eq!(list, vec!["only one"]);
    }

    #[test]
    fn test_string_list_rejects_scalar() {
        assert!(parse_string_list("42").is_err());
    }
}
