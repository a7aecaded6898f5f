//! Extraction of the analysis payload from model output
//!
//! The model is asked for bare JSON but does not always comply. Extraction
//! runs an ordered list of strategies, each either producing a value or
//! reporting [`NotFound`]:
//!
//! 1. the raw body as JSON (direct, then fence-stripped brace scan), accepted
//!    only if it carries one of the expected fields
//! 2. the concatenated text of the first candidate's parts, same extraction
//! 3. plain-text passthrough into `strategy`
//!
//! Nothing in here fails; missing structure degrades to empty values.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::models::{AnalysisPayload, RawKeyword};
use crate::utils::json::{first_text_field, is_truthy, scalar_text};

static JSON_FENCE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```json").unwrap());
static LIST_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n|,|•|-").unwrap());

const PAYLOAD_FIELDS: [&str; 3] = ["keywords", "platforms", "strategy"];

/// No usable JSON object in the inspected text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotFound;

fn parse_object(text: &str) -> Result<Value, NotFound> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Ok(value),
        _ => Err(NotFound),
    }
}

/// Strip Markdown fences, then parse the span from the first `{` to the last `}`
fn parse_fenced_or_embedded(text: &str) -> Result<Value, NotFound> {
    let cleaned = JSON_FENCE_REGEX.replace_all(text.trim(), "```").replace("```", "");
    let cleaned = cleaned.trim();

    let start = cleaned.find('{').ok_or(NotFound)?;
    let end = cleaned.rfind('}').ok_or(NotFound)?;
    if end <= start {
        return Err(NotFound);
    }
    parse_object(&cleaned[start..=end])
}

/// Lenient JSON object extraction from free-form model text
pub fn extract_json_object(text: &str) -> Result<Value, NotFound> {
    parse_object(text).or_else(|_| parse_fenced_or_embedded(text))
}

fn has_payload_fields(value: &Value) -> bool {
    PAYLOAD_FIELDS
        .iter()
        .any(|field| value.get(*field).is_some_and(is_truthy))
}

/// Concatenated `text` of the first candidate's content parts
pub fn candidate_text(envelope: Option<&Value>) -> String {
    envelope
        .and_then(|v| v.pointer("/candidates/0/content/parts"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn from_raw_body(raw_text: &str) -> Result<Value, NotFound> {
    extract_json_object(raw_text).and_then(|value| {
        if has_payload_fields(&value) { Ok(value) } else { Err(NotFound) }
    })
}

/// Build an [`AnalysisPayload`] from a model response.
pub fn parse_payload(raw_text: &str, parsed_json: Option<&Value>) -> AnalysisPayload {
    if let Ok(value) = from_raw_body(raw_text) {
        return payload_from_value(&value);
    }

    let text = candidate_text(parsed_json);
    match extract_json_object(&text) {
        Ok(value) => payload_from_value(&value),
        Err(NotFound) => {
            tracing::debug!("Model output held no JSON object, passing text through");
            AnalysisPayload {
                keywords: Vec::new(),
                platforms: Vec::new(),
                strategy: text.trim().to_string(),
            }
        },
    }
}

fn payload_from_value(value: &Value) -> AnalysisPayload {
    AnalysisPayload {
        keywords: value.get("keywords").map(raw_keywords).unwrap_or_default(),
        platforms: value.get("platforms").map(normalize_list).unwrap_or_default(),
        strategy: value
            .get("strategy")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}

/// Classify each keyword entry; entries that are neither objects nor strings are dropped.
pub fn raw_keywords(value: &Value) -> Vec<RawKeyword> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(_) => Some(RawKeyword::Structured {
                ko: first_text_field(item, &["ko", "korean"]).unwrap_or_default(),
                local: first_text_field(item, &["local", "native"]).unwrap_or_default(),
            }),
            Value::String(text) => Some(RawKeyword::Formatted { text: text.clone() }),
            _ => None,
        })
        .collect()
}

/// Normalize a list-ish value into trimmed, non-empty strings.
///
/// Arrays are taken element-wise; a string is split on newlines, commas,
/// bullets and dashes.
pub fn normalize_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|v| scalar_text(v).unwrap_or_else(|| v.to_string()))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => LIST_SEPARATOR_REGEX
            .split(s)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
