// Google Gemini structured-generation client
//
// Builds generateContent requests with responseMimeType application/json and
// a response schema, decodes the returned text leniently, and walks a static
// fallback chain when the requested model fails. Preview models fall back to
// their stable siblings.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{parse_lenient, StructuredGenerator, StructuredReply, StructuredRequest};
use crate::config::constants::LLM_CALL_DEADLINE_SECS;
use crate::router::{FAST_MODEL, HEAVY_MODEL};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Pause before the single same-model repeat. Anything that survives one
/// repeat is handed to the fallback chain instead of being retried further.
const REPEAT_PAUSE: Duration = Duration::from_millis(750);

// Fallback chain per model id. First success wins; exhaustion surfaces the
// original (primary-model) error.
static FALLBACKS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    HashMap::from([
        (HEAVY_MODEL, &["gemini-2.5-pro", "gemini-2.5-flash"][..]),
        (FAST_MODEL, &["gemini-2.5-flash", "gemini-2.0-flash"][..]),
    ])
});

/// Fallback model ids for a given primary, empty when none are registered.
pub fn fallbacks_for(model: &str) -> &'static [&'static str] {
    FALLBACKS.get(model).copied().unwrap_or(&[])
}

/// Gemini API client for structured JSON generation.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            anyhow::bail!("Gemini API key is empty");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(LLM_CALL_DEADLINE_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, api_key })
    }

    fn to_gemini_request(&self, request: &StructuredRequest) -> GeminiRequest {
        let mut parts: Vec<GeminiPart> = request
            .images
            .iter()
            .map(|image| GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            })
            .collect();
        parts.push(GeminiPart::Text {
            text: request.prompt.clone(),
        });

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.model.temperature,
                max_output_tokens: request.model.max_output_tokens,
                response_mime_type: "application/json".to_string(),
                response_schema: request.schema.clone(),
            },
        }
    }

    /// One call to one model, no retry and no fallback.
    async fn call_model(&self, model: &str, request: &StructuredRequest) -> Result<StructuredReply> {
        let body = self.to_gemini_request(request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, model, self.api_key
        );

        tracing::debug!(model, prompt_len = request.prompt.len(), "Gemini structured call");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Failed to reach Gemini API for model {model}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API request failed for {model}: {status}: {error_body}");
        }

        let gemini: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini API response envelope")?;

        let candidate = gemini
            .candidates
            .into_iter()
            .next()
            .context("Gemini returned no candidates")?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|part| match part {
                GeminiPart::Text { text } => Some(text),
                GeminiPart::InlineData { .. } => None,
            })
            .collect();

        let data = parse_lenient(&text)?;

        Ok(StructuredReply {
            data,
            token_count: gemini.usage_metadata.map(|u| u.total_token_count),
            model_used: model.to_string(),
        })
    }
}

impl GeminiClient {
    /// One call plus at most one same-model repeat after a short pause.
    ///
    /// Deeper retrying is deliberately left to the fallback chain: a model
    /// that fails twice in a row is better served by a different model than
    /// by a third identical request.
    async fn call_with_repeat(&self, model: &str, request: &StructuredRequest) -> Result<StructuredReply> {
        let first = match self.call_model(model, request).await {
            Ok(reply) => return Ok(reply),
            Err(e) => e,
        };

        tracing::warn!(
            model,
            pause_ms = REPEAT_PAUSE.as_millis() as u64,
            "Model call failed once, repeating: {first:#}"
        );
        tokio::time::sleep(REPEAT_PAUSE).await;
        self.call_model(model, request).await
    }
}

#[async_trait]
impl StructuredGenerator for GeminiClient {
    async fn generate_structured(&self, request: &StructuredRequest) -> Result<StructuredReply> {
        let primary = request.model.model.as_str();

        let primary_error = match self.call_with_repeat(primary, request).await {
            Ok(reply) => return Ok(reply),
            Err(e) => e,
        };

        for fallback in fallbacks_for(primary) {
            tracing::warn!(
                requested = %primary,
                fallback = %fallback,
                "Primary model failed, trying fallback"
            );
            if let Ok(reply) = self.call_with_repeat(fallback, request).await {
                return Ok(reply);
            }
        }

        // All models exhausted: surface the original error
        Err(primary_error)
    }
}

// Gemini API wire types

#[derive(Debug, Clone, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Clone, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
    #[serde(rename = "finishReason")]
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeminiUsage {
    #[serde(rename = "totalTokenCount")]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_rejects_empty_key() {
        assert!(GeminiClient::new(String::new()).is_err());
        assert!(GeminiClient::new("   ".to_string()).is_err());
    }

    #[test]
    fn test_client_accepts_key() {
        assert!(GeminiClient::new("test-key".to_string()).is_ok());
    }

    #[test]
    fn test_fallback_chain_for_preview_models() {
        assert_eq!(fallbacks_for(HEAVY_MODEL), &["gemini-2.5-pro", "gemini-2.5-flash"]);
        assert_eq!(fallbacks_for(FAST_MODEL), &["gemini-2.5-flash", "gemini-2.0-flash"]);
    }

    #[test]
    fn test_unknown_model_has_no_fallbacks() {
        assert!(fallbacks_for("some-custom-model").is_empty());
    }

    #[test]
    fn test_request_serialization_shape() {
        let client = GeminiClient::new("k".to_string()).unwrap();
        let request = StructuredRequest::new(
            "design a plan",
            crate::router::route(crate::router::AgentRole::Spatial),
            serde_json::json!({"type": "object"}),
        );
        let body = client.to_gemini_request(&request);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "design a plan");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!(json["generationConfig"]["responseSchema"].is_object());
    }

    #[test]
    fn test_image_parts_precede_text() {
        let client = GeminiClient::new("k".to_string()).unwrap();
        let mut request = StructuredRequest::new(
            "analyze this",
            crate::router::route(crate::router::AgentRole::Input),
            serde_json::json!({"type": "object"}),
        );
        request.images.push(super::super::ImagePart {
            mime_type: "image/png".to_string(),
            data: "aGVsbG8=".to_string(),
        });
        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "analyze this");
    }
}
