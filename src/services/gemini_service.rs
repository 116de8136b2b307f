// src/services/gemini_service.rs
use crate::errors::StudioError;
use crate::models::*;
use crate::services::prompt_builder::build_prompt;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use log::{debug, info, warn};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde::de::IgnoredAny;
use serde_json::{Value, json};
use std::sync::LazyLock;
use std::time::Instant;

const WALL_TEXTURE_INSTRUCTION: &str = "Use the following image as a texture for the walls:";
const CABINET_TEXTURE_INSTRUCTION: &str = "Use the following image as a texture for the cabinets:";
const FLOOR_TEXTURE_INSTRUCTION: &str = "Use the following image as a texture for the floor:";
const MASK_INSTRUCTION: &str =
    "IMPORTANT: Apply edits ONLY to the white areas of the following mask image:";

static METADATA_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid metadata fence pattern")
});

/// Anything that can turn a configuration into an edited image.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn generate_edit(
        &self,
        config: &EditorConfiguration,
        language: Language,
    ) -> Result<GenerationResult, StudioError>;
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

pub struct GeminiService {
    api_key: Option<String>,
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiService {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            api_key,
            model,
            base_url,
            client: Client::new(),
        }
    }

    fn api_key(&self) -> Result<&str, StudioError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                StudioError::Configuration(
                    "Gemini API key not found. Set GEMINI_API_KEY (or API_KEY).".to_string(),
                )
            })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

fn inline_part(image: &ImageAttachment) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type,
            "data": general_purpose::STANDARD.encode(&image.data)
        }
    })
}

/// Ordered request parts: base image, textures with their explanations,
/// the mask when masking is manual, and the prompt last.
fn build_parts(config: &EditorConfiguration, language: Language) -> Result<Vec<Value>, StudioError> {
    let base_image = config
        .base_image
        .as_ref()
        .ok_or_else(|| StudioError::MissingInput("Base image is missing.".to_string()))?;

    let mut parts = vec![inline_part(base_image)];

    let textures = [
        (&config.wall_texture_image, WALL_TEXTURE_INSTRUCTION),
        (&config.cabinet_texture_image, CABINET_TEXTURE_INSTRUCTION),
        (&config.floor_texture_image, FLOOR_TEXTURE_INSTRUCTION),
    ];
    for (texture, instruction) in textures {
        if let Some(texture) = texture {
            parts.push(json!({ "text": instruction }));
            parts.push(inline_part(texture));
        }
    }

    if config.mask_mode == MaskMode::Manual {
        if let Some(mask) = &config.mask_image {
            parts.push(json!({ "text": MASK_INSTRUCTION }));
            parts.push(inline_part(mask));
        }
    }

    parts.push(json!({ "text": build_prompt(config, language) }));
    Ok(parts)
}

fn build_payload(parts: Vec<Value>, seed: u32) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "responseModalities": ["IMAGE", "TEXT"],
            "seed": seed
        }
    })
}

fn summarize_parts(parts: &[Value]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| {
            if let Some(text) = part.get("text").and_then(|v| v.as_str()) {
                json!({ "textLen": text.chars().count() })
            } else if let Some(inline_data) = part.get("inlineData") {
                let data_len = inline_data
                    .get("data")
                    .and_then(|v| v.as_str())
                    .map(|v| v.len())
                    .unwrap_or(0);
                json!({ "inlineData": { "mimeType": inline_data["mimeType"], "dataLen": data_len } })
            } else {
                json!({ "unknownPart": true })
            }
        })
        .collect()
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(message) = value.pointer("/error/message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }

    trimmed.chars().take(2000).collect()
}

/// Pulls the fenced JSON block out of a text part. `Ok(None)` when there is
/// no fence at all.
fn extract_metadata(text: &str) -> Result<Option<Value>, StudioError> {
    let Some(captures) = METADATA_FENCE.captures(text) else {
        return Ok(None);
    };
    let body = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| StudioError::MalformedMetadata(e.to_string()))
}

/// First image part wins; metadata is best effort and never fails the call.
fn parse_response(response: GeminiResponse) -> GenerationResult {
    let mut result = GenerationResult::default();

    let first_candidate = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next();
    let parts = first_candidate
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts)
        .unwrap_or_default();

    for part in parts {
        match part {
            GeminiPart::InlineData { inline_data } => {
                if result.image_b64.is_none() && inline_data.mime_type.starts_with("image/") {
                    result.image_b64 = Some(inline_data.data);
                    result.image_mime_type = Some(inline_data.mime_type);
                }
            }
            GeminiPart::Text { text } => {
                if result.metadata.is_some() {
                    continue;
                }
                match extract_metadata(&text) {
                    Ok(metadata) => result.metadata = metadata,
                    Err(e) => warn!("Failed to parse JSON from model response: {}", e),
                }
            }
            GeminiPart::Other(_) => {}
        }
    }

    result
}

#[async_trait]
impl ImageEditor for GeminiService {
    async fn generate_edit(
        &self,
        config: &EditorConfiguration,
        language: Language,
    ) -> Result<GenerationResult, StudioError> {
        let start = Instant::now();
        let parts = build_parts(config, language)?;
        let api_key = self.api_key()?;

        debug!(
            "Gemini payload for {}: {}",
            self.model,
            Value::Array(summarize_parts(&parts))
        );
        let payload = build_payload(parts, config.seed);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StudioError::RemoteCall(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StudioError::RemoteCall(format!(
                "Gemini request failed with status {}: {}",
                status,
                summarize_error_body(&body)
            )));
        }

        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(|e| StudioError::RemoteCall(format!("Failed to parse Gemini response: {}", e)))?;

        let result = parse_response(reply);
        info!(
            "Gemini edit finished in {} ms (model={}, image={}, metadata={})",
            start.elapsed().as_millis(),
            self.model,
            result.image_b64.is_some(),
            result.metadata.is_some()
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn attachment(name: &str) -> ImageAttachment {
        ImageAttachment {
            filename: name.to_string(),
            mime_type: "image/png".to_string(),
            width: 2,
            height: 2,
            data: Bytes::from(name.as_bytes().to_vec()),
        }
    }

    fn encoded(name: &str) -> String {
        general_purpose::STANDARD.encode(name.as_bytes())
    }

    fn response(body: Value) -> GeminiResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn parts_are_ordered_base_textures_mask_prompt() {
        let config = EditorConfiguration {
            base_image: Some(attachment("base")),
            wall_texture_image: Some(attachment("wall")),
            floor_texture_image: Some(attachment("floor")),
            mask_mode: MaskMode::Manual,
            mask_image: Some(attachment("mask")),
            ..Default::default()
        };

        let parts = build_parts(&config, Language::En).unwrap();
        assert_eq!(parts.len(), 8);
        assert_eq!(parts[0]["inlineData"]["data"], encoded("base"));
        assert_eq!(parts[1]["text"], WALL_TEXTURE_INSTRUCTION);
        assert_eq!(parts[2]["inlineData"]["data"], encoded("wall"));
        assert_eq!(parts[3]["text"], FLOOR_TEXTURE_INSTRUCTION);
        assert_eq!(parts[4]["inlineData"]["data"], encoded("floor"));
        assert_eq!(parts[5]["text"], MASK_INSTRUCTION);
        assert_eq!(parts[6]["inlineData"]["mimeType"], "image/png");
        assert!(
            parts[7]["text"]
                .as_str()
                .unwrap()
                .starts_with("**PRIME DIRECTIVE")
        );
    }

    #[test]
    fn mask_is_skipped_in_auto_mode() {
        let config = EditorConfiguration {
            base_image: Some(attachment("base")),
            mask_mode: MaskMode::Auto,
            mask_image: Some(attachment("mask")),
            ..Default::default()
        };

        let parts = build_parts(&config, Language::Zh).unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[1]["text"].as_str().unwrap().starts_with("**首要指令"));
    }

    #[test]
    fn payload_requests_image_and_text() {
        let payload = build_payload(vec![json!({ "text": "hi" })], 204);
        assert_eq!(
            payload["generationConfig"]["responseModalities"],
            json!(["IMAGE", "TEXT"])
        );
        assert_eq!(payload["generationConfig"]["seed"], 204);
        assert_eq!(payload["contents"][0]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn missing_base_image_fails_before_network() {
        let service = GeminiService::new(
            Some("key".to_string()),
            "gemini-2.5-flash-image".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        let err = service
            .generate_edit(&EditorConfiguration::default(), Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::MissingInput(_)));
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let service = GeminiService::new(
            Some("   ".to_string()),
            "gemini-2.5-flash-image".to_string(),
            "http://127.0.0.1:9".to_string(),
        );
        let config = EditorConfiguration {
            base_image: Some(attachment("base")),
            ..Default::default()
        };
        let err = service.generate_edit(&config, Language::En).await.unwrap_err();
        assert!(matches!(err, StudioError::Configuration(_)));
    }

    #[test]
    fn image_without_text_yields_image_only() {
        let result = parse_response(response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }
                ]}
            }]
        })));

        assert_eq!(result.image_b64.as_deref(), Some("aGVsbG8="));
        assert_eq!(result.image_mime_type.as_deref(), Some("image/png"));
        assert!(result.metadata.is_none());
    }

    #[test]
    fn malformed_metadata_is_dropped_quietly() {
        let result = parse_response(response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Summary:\n```json\n{ \"applied_style\": \"Zen\", }\n```" },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "AAAA" } }
                ]}
            }]
        })));

        assert_eq!(result.image_b64.as_deref(), Some("AAAA"));
        assert!(result.metadata.is_none());
    }

    #[test]
    fn metadata_is_parsed_from_fenced_block() {
        let result = parse_response(response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here you go.\n```json\n{\"applied_style\": \"Zen\", \"ambiance\": \"night\"}\n```\n" },
                    { "inlineData": { "mimeType": "image/png", "data": "first" } },
                    { "inlineData": { "mimeType": "image/png", "data": "second" } }
                ]}
            }]
        })));

        assert_eq!(result.image_b64.as_deref(), Some("first"));
        let metadata = result.metadata.unwrap();
        assert_eq!(metadata["applied_style"], "Zen");
        assert_eq!(metadata["ambiance"], "night");
    }

    #[test]
    fn text_only_reply_has_no_image() {
        let result = parse_response(response(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I cannot edit this image." }] }
            }]
        })));
        assert!(result.image_b64.is_none());
        assert!(result.metadata.is_none());

        let empty = parse_response(response(json!({})));
        assert_eq!(empty, GenerationResult::default());
    }

    #[test]
    fn non_image_inline_data_is_ignored() {
        let result = parse_response(response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "application/pdf", "data": "cGRm" } },
                    { "thoughtSignature": "abc" }
                ]}
            }]
        })));
        assert!(result.image_b64.is_none());
    }

    #[test]
    fn unrecognized_parts_are_skipped() {
        let result = parse_response(response(json!({
            "candidates": [{
                "content": { "parts": [
                    { "functionCall": { "name": "noop", "args": { "depth": [1, 2, 3] } } },
                    null,
                    { "inlineData": { "mimeType": "image/webp", "data": "d2VicA==" } }
                ]}
            }]
        })));
        assert_eq!(result.image_b64.as_deref(), Some("d2VicA=="));
        assert_eq!(result.image_mime_type.as_deref(), Some("image/webp"));
    }

    #[test]
    fn fence_without_json_tag_is_not_metadata() {
        assert!(extract_metadata("```\n{}\n```").unwrap().is_none());
        assert!(matches!(
            extract_metadata("```json\nnot json\n```"),
            Err(StudioError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn error_body_prefers_api_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid."}}"#;
        assert_eq!(summarize_error_body(body), "API key not valid.");
        assert_eq!(summarize_error_body("  "), "empty response body");
        assert_eq!(summarize_error_body("Bad Gateway"), "Bad Gateway");
    }
}
