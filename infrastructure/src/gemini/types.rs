//! Wire types for the Gemini `generateContent` API
//!
//! Request building, response extraction and HTTP status classification.
//! Everything here is pure so it can be tested without a network.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use quorum_domain::{BackendFailure, ImageRef, Prompt, excerpt};
use serde::{Deserialize, Serialize};

// ─── Request ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            file_data: None,
            inline_data: None,
        }
    }

    fn file(image: &ImageRef) -> Self {
        Self {
            text: None,
            file_data: Some(FileData {
                mime_type: image.mime_type().to_string(),
                file_uri: image.uri().to_string(),
            }),
            inline_data: None,
        }
    }

    fn inline(image: &ImageRef, bytes: &[u8]) -> Self {
        Self {
            text: None,
            file_data: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type().to_string(),
                data: BASE64.encode(bytes),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// Image bytes sent in the request body, base64 encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Build the request body for one prompt.
///
/// `inline_image` holds the bytes of a local image; without it the prompt's
/// image is referenced by URI.
pub fn build_request(
    prompt: &Prompt,
    inline_image: Option<&[u8]>,
    generation: GenerationConfig,
) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(image) = &prompt.image {
        parts.push(match inline_image {
            Some(bytes) => Part::inline(image, bytes),
            None => Part::file(image),
        });
    }
    parts.push(Part::text(prompt.text.clone()));

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part::text(prompt.system.clone())],
        },
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        generation_config: generation,
    }
}

// ─── Response ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

/// Pull the answer text out of a response body.
///
/// Text parts of the first candidate are concatenated. A body that is not
/// JSON, has no candidates, or carries no text is malformed.
pub fn extract_text(body: &str) -> Result<String, BackendFailure> {
    let response: GenerateContentResponse = serde_json::from_str(body).map_err(|e| {
        BackendFailure::malformed(format!("invalid response body: {}", e))
    })?;

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| BackendFailure::malformed("response has no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(BackendFailure::malformed(format!(
            "candidate has no text (finish reason: {})",
            reason
        )));
    }
    Ok(text)
}

// ─── Errors ──────────────────────────────────────────────────────

/// Classify a non-success HTTP status and its body
pub fn classify_status(status: u16, body: &str) -> BackendFailure {
    let detail = format!("HTTP {}: {}", status, excerpt(body.trim(), 200));
    match status {
        429 => BackendFailure::rate_limited(detail),
        401 | 403 => BackendFailure::auth(detail),
        400 if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
            BackendFailure::auth(detail)
        }
        400..=499 => BackendFailure::malformed(detail),
        _ => BackendFailure::unknown(detail),
    }
}

/// Classify a transport-level error
pub fn classify_transport(err: &reqwest::Error) -> BackendFailure {
    if err.is_timeout() {
        BackendFailure::timeout(format!("request timed out: {}", err))
    } else if err.is_decode() {
        BackendFailure::malformed(format!("could not read response: {}", err))
    } else {
        BackendFailure::unknown(format!("transport error: {}", err))
    }
}
