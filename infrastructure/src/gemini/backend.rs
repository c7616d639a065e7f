//! Gemini reasoning backend over HTTP

use super::types::{self, GenerationConfig};
use crate::config::FileBackendConfig;
use async_trait::async_trait;
use quorum_application::ReasoningBackend;
use quorum_domain::{BackendFailure, ImageRef, Prompt};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// API key header; keeps tokens out of request URLs and logs
const API_KEY_HEADER: &str = "x-goog-api-key";

/// [`ReasoningBackend`] implementation for the Gemini `generateContent` API
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    model: String,
    generation: GenerationConfig,
}

impl GeminiBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        generation: GenerationConfig,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            generation,
        })
    }

    pub fn from_config(config: &FileBackendConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.base_url,
            &config.model,
            GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ReasoningBackend for GeminiBackend {
    async fn call(
        &self,
        token: &str,
        prompt: &Prompt,
        timeout: Duration,
    ) -> Result<String, BackendFailure> {
        let inline_image = match prompt.image.as_ref().and_then(ImageRef::local_path) {
            Some(path) => Some(read_image(path).await?),
            None => None,
        };
        let body = types::build_request(prompt, inline_image.as_deref(), self.generation);

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, token)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| types::classify_transport(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| types::classify_transport(&e))?;

        debug!(
            model = %self.model,
            status = status.as_u16(),
            bytes = text.len(),
            "Gemini response received"
        );

        if !status.is_success() {
            return Err(types::classify_status(status.as_u16(), &text));
        }
        types::extract_text(&text)
    }
}

/// Load a local image for inline upload. An unreadable file is the
/// caller's input error, never retried.
async fn read_image(path: &Path) -> Result<Vec<u8>, BackendFailure> {
    tokio::fs::read(path).await.map_err(|e| {
        BackendFailure::malformed(format!("cannot read image {}: {}", path.display(), e))
    })
}
