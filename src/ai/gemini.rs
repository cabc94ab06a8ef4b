use anyhow::{Context, Result};
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{EditOutcome, EditRequest, GenerateRequest, GeneratedImage, ImageService};
use crate::session::OUTPUT_MIME_TYPE;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google generative-image backend.
///
/// The generate path calls the Imagen `:predict` endpoint; the edit path
/// calls `:generateContent` on a multimodal image model with IMAGE+TEXT
/// response modalities.
pub struct GeminiService {
    api_key: String,
    generate_model: String,
    edit_model: String,
    client: Client,
}

impl GeminiService {
    pub fn new(api_key: String, generate_model: String, edit_model: String) -> Self {
        Self {
            api_key,
            generate_model,
            edit_model,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl ImageService for GeminiService {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<GeneratedImage>> {
        let url = format!("{API_BASE}/{}:predict", self.generate_model);

        let body = json!({
            "instances": [
                { "prompt": request.prompt }
            ],
            "parameters": {
                "sampleCount": request.count,
                "aspectRatio": request.aspect_ratio.as_str(),
                "outputMimeType": OUTPUT_MIME_TYPE
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Image generation request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read image generation response")?;

        if !status.is_success() {
            anyhow::bail!("Image generation API error ({status}): {text}");
        }

        parse_predict_response(&text)
    }

    async fn edit(&self, request: &EditRequest) -> Result<EditOutcome> {
        let url = format!("{API_BASE}/{}:generateContent", self.edit_model);

        // Every uploaded image first, then the prompt, in one user turn.
        let mut parts: Vec<serde_json::Value> = request
            .images
            .iter()
            .map(|img| {
                json!({
                    "inline_data": {
                        "mime_type": img.mime_type,
                        "data": img.base64
                    }
                })
            })
            .collect();
        parts.push(json!({ "text": request.prompt }));

        let body = json!({
            "contents": [
                { "role": "user", "parts": parts }
            ],
            "generationConfig": {
                "responseModalities": ["IMAGE", "TEXT"]
            }
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Image edit request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read image edit response")?;

        if !status.is_success() {
            anyhow::bail!("Image edit API error ({status}): {text}");
        }

        parse_edit_response(&text)
    }
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64: Option<String>,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    data: String,
}

// ── Response parsing ─────────────────────────────────────────────────

/// Parse an Imagen `:predict` response body into decoded images.
///
/// An empty or missing `predictions` array is a valid "nothing produced"
/// response (e.g. everything was safety-filtered), not an error.
fn parse_predict_response(text: &str) -> Result<Vec<GeneratedImage>> {
    let resp: PredictResponse =
        serde_json::from_str(text).context("Failed to parse image generation response JSON")?;

    let mut images = Vec::new();
    for prediction in resp.predictions {
        let Some(b64) = prediction.bytes_base64 else {
            continue;
        };
        let data = base64::engine::general_purpose::STANDARD
            .decode(&b64)
            .context("Generated image is not valid base64")?;
        images.push(GeneratedImage {
            data,
            mime_type: prediction
                .mime_type
                .unwrap_or_else(|| OUTPUT_MIME_TYPE.to_string()),
        });
    }
    Ok(images)
}

/// Parse a `:generateContent` response body into an [`EditOutcome`].
///
/// Every part carrying inline image data is collected, across all
/// candidates; text parts are joined into the commentary.
fn parse_edit_response(text: &str) -> Result<EditOutcome> {
    let resp: GenerateContentResponse =
        serde_json::from_str(text).context("Failed to parse image edit response JSON")?;

    let mut outcome = EditOutcome::default();
    let mut commentary = Vec::new();

    for candidate in resp.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(inline) = part.inline_data {
                let data = base64::engine::general_purpose::STANDARD
                    .decode(&inline.data)
                    .context("Edited image is not valid base64")?;
                outcome.images.push(GeneratedImage {
                    data,
                    mime_type: inline
                        .mime_type
                        .unwrap_or_else(|| OUTPUT_MIME_TYPE.to_string()),
                });
            } else if let Some(t) = part.text {
                if !t.is_empty() {
                    commentary.push(t);
                }
            }
        }
    }

    if !commentary.is_empty() {
        outcome.commentary = Some(commentary.join("\n"));
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── parse_predict_response ───────────────────────────────────────

    #[test]
    fn predict_two_images_in_order() {
        let body = r#"{
            "predictions": [
                { "bytesBase64Encoded": "Zmlyc3Q=", "mimeType": "image/png" },
                { "bytesBase64Encoded": "c2Vjb25k", "mimeType": "image/png" }
            ]
        }"#;

        let images = parse_predict_response(body).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].data, b"first");
        assert_eq!(images[1].data, b"second");
        assert_eq!(images[0].mime_type, "image/png");
    }

    #[test]
    fn predict_empty_predictions_is_ok() {
        let images = parse_predict_response(r#"{"predictions": []}"#).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn predict_missing_predictions_is_ok() {
        // Fully safety-filtered responses omit the array entirely
        let images = parse_predict_response("{}").unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn predict_defaults_mime_type() {
        let body = r#"{"predictions": [{ "bytesBase64Encoded": "YWJj" }]}"#;
        let images = parse_predict_response(body).unwrap();
        assert_eq!(images[0].mime_type, OUTPUT_MIME_TYPE);
    }

    #[test]
    fn predict_skips_imageless_predictions() {
        let body = r#"{
            "predictions": [
                { "raiFilteredReason": "blocked" },
                { "bytesBase64Encoded": "b2s=", "mimeType": "image/png" }
            ]
        }"#;
        let images = parse_predict_response(body).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].data, b"ok");
    }

    #[test]
    fn predict_invalid_base64_fails() {
        let body = r#"{"predictions": [{ "bytesBase64Encoded": "!!!not base64!!!" }]}"#;
        assert!(parse_predict_response(body).is_err());
    }

    #[test]
    fn predict_garbage_fails() {
        assert!(parse_predict_response("not json").is_err());
    }

    // ── parse_edit_response ──────────────────────────────────────────

    #[test]
    fn edit_image_and_text_parts() {
        let body = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "text": "Here is your edit." },
                            { "inlineData": { "mimeType": "image/png", "data": "ZWRpdGVk" } }
                        ]
                    }
                }
            ]
        }"#;

        let outcome = parse_edit_response(body).unwrap();
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.images[0].data, b"edited");
        assert_eq!(outcome.commentary.as_deref(), Some("Here is your edit."));
    }

    #[test]
    fn edit_snake_case_inline_data_accepted() {
        let body = r#"{
            "candidates": [
                {
                    "content": {
                        "parts": [
                            { "inline_data": { "mime_type": "image/png", "data": "b2s=" } }
                        ]
                    }
                }
            ]
        }"#;

        let outcome = parse_edit_response(body).unwrap();
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.images[0].data, b"ok");
    }

    #[test]
    fn edit_collects_across_candidates() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "first candidate, text only" } ] } },
                { "content": { "parts": [ { "inlineData": { "data": "aW1n" } } ] } }
            ]
        }"#;

        let outcome = parse_edit_response(body).unwrap();
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.images[0].data, b"img");
        assert_eq!(outcome.images[0].mime_type, OUTPUT_MIME_TYPE);
    }

    #[test]
    fn edit_text_only_has_no_images() {
        let body = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "I cannot edit that." } ] } }
            ]
        }"#;

        let outcome = parse_edit_response(body).unwrap();
        assert!(outcome.images.is_empty());
        assert_eq!(outcome.commentary.as_deref(), Some("I cannot edit that."));
    }

    #[test]
    fn edit_no_candidates_is_empty() {
        let outcome = parse_edit_response(r#"{"candidates": []}"#).unwrap();
        assert!(outcome.images.is_empty());
        assert!(outcome.commentary.is_none());
    }

    #[test]
    fn edit_candidate_without_content_skipped() {
        let body = r#"{"candidates": [ { "finishReason": "SAFETY" } ]}"#;
        let outcome = parse_edit_response(body).unwrap();
        assert!(outcome.images.is_empty());
    }

    #[test]
    fn edit_garbage_fails() {
        assert!(parse_edit_response("<html>502</html>").is_err());
    }
}
