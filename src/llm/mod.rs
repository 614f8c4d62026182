// LLM call layer
//
// One primitive: prompt + JSON schema in, decoded JSON value out. The layer
// owns response sanitization (models wrap JSON in code fences and leave
// trailing commas) and the per-model fallback chain. It holds no mutable
// state and is safe to call concurrently.

mod client;

pub use client::{fallbacks_for, GeminiClient};

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::router::ModelRouterConfig;

/// An inline image attached to a structured call.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

/// A single structured-generation request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    pub model: ModelRouterConfig,
    /// JSON schema the provider is asked to conform to
    pub schema: serde_json::Value,
    pub images: Vec<ImagePart>,
}

impl StructuredRequest {
    pub fn new(prompt: impl Into<String>, model: ModelRouterConfig, schema: serde_json::Value) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            schema,
            images: Vec::new(),
        }
    }
}

/// The decoded result of a structured call.
#[derive(Debug, Clone)]
pub struct StructuredReply {
    pub data: serde_json::Value,
    pub token_count: Option<u32>,
    /// The model that actually served the call — differs from the requested
    /// model when the fallback chain was used.
    pub model_used: String,
}

/// The structured-generation capability agents depend on.
///
/// Production uses `GeminiClient`; tests substitute a scripted implementation.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<StructuredReply>;
}

static TRAILING_COMMAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*([}\]])").expect("trailing comma regex"));

/// Strip leading/trailing markdown code fences (```json ... ``` or ``` ... ```).
fn strip_markdown_fences(s: &str) -> &str {
    let s = s.trim();
    let s = if let Some(rest) = s.strip_prefix("```json") {
        rest
    } else if let Some(rest) = s.strip_prefix("```") {
        rest
    } else {
        s
    };
    if let Some(rest) = s.strip_suffix("```") {
        rest.trim()
    } else {
        s.trim()
    }
}

/// Two-stage JSON parse: strict first, then sanitize and retry.
///
/// Sanitization strips markdown fences and removes trailing commas before
/// closing braces/brackets — the two decodable failure modes models
/// actually produce.
pub fn parse_lenient(text: &str) -> Result<serde_json::Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }

    let stripped = strip_markdown_fences(text);
    let sanitized = TRAILING_COMMAS.replace_all(stripped, "$1");
    serde_json::from_str(&sanitized)
        .with_context(|| format!("Response is not valid JSON after sanitization: {:.200}", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient_strict_json() {
        let value = parse_lenient(r#"{"rooms": []}"#).unwrap();
        assert!(value["rooms"].is_array());
    }

    #[test]
    fn test_parse_lenient_strips_json_fence() {
        let value = parse_lenient("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_lenient_strips_bare_fence() {
        let value = parse_lenient("```\n[1, 2, 3]\n```").unwrap();
        assert_eq!(value.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_parse_lenient_removes_trailing_commas() {
        let value = parse_lenient(r#"{"a": [1, 2,], "b": {"c": 3,},}"#).unwrap();
        assert_eq!(value["a"].as_array().unwrap().len(), 2);
        assert_eq!(value["b"]["c"], 3);
    }

    #[test]
    fn test_parse_lenient_fenced_with_trailing_commas() {
        let value = parse_lenient("```json\n{\"rooms\": [{\"id\": \"r1\",},],}\n```").unwrap();
        assert_eq!(value["rooms"][0]["id"], "r1");
    }

    #[test]
    fn test_parse_lenient_rejects_garbage() {
        assert!(parse_lenient("not json at all").is_err());
    }

    #[test]
    fn test_trailing_comma_inside_string_untouched() {
        // A string containing ",}" must survive the strict parse path
        let value = parse_lenient(r#"{"msg": "a,}"}"#).unwrap();
        assert_eq!(value["msg"], "a,}");
    }

    #[test]
    fn test_strip_fences_no_fences() {
        assert_eq!(strip_markdown_fences("{\"a\":1}"), "{\"a\":1}");
    }
}
