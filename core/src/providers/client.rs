//! Outbound model clients.
//!
//! Each client performs exactly one text-generation call against one named
//! model and extracts plain text from the vendor's response shape. Failure
//! modes are kept distinct so the fallback runner can tell a still-loading
//! model apart from a hard provider error.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Outcome taxonomy for a single model invocation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider reported the model is loading and not ready yet.
    #[error("model {0} is loading")]
    ModelLoading(String),
    /// Any other non-success response, carrying the raw error payload.
    #[error("provider returned {status}: {body}")]
    Upstream { status: u16, body: String },
    /// The call succeeded but yielded no usable text.
    #[error("model produced no usable text")]
    EmptyOutput,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Seam between the fallback runner and a concrete inference backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError>;
}

fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(45))
        .user_agent("BrainBlog-Core/0.1 (+https://github.com/brainblog)")
        .build()
        .context("failed to construct HTTP client")
}

/// Client for the Hugging Face hosted inference API (primary family).
pub struct HfClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl HfClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl TextGenerator for HfClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}", self.base_url.trim_end_matches('/'), model);
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "inputs": prompt }))
            .send()
            .await?;

        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            return Err(ProviderError::ModelLoading(model.to_string()));
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        let body: Value = response.json().await?;
        extract_generated_text(&body).ok_or(ProviderError::EmptyOutput)
    }
}

/// Client for the OpenAI chat completions API (secondary family).
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let payload = serde_json::json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.2,
            "max_tokens": 256,
        });
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Upstream { status, body });
        }

        let body: Value = response.json().await?;
        extract_chat_content(&body).ok_or(ProviderError::EmptyOutput)
    }
}

/// Pull generated text out of the inference API's array-of-objects response.
/// The field name varies by model pipeline, so all three known shapes are
/// accepted.
fn extract_generated_text(body: &Value) -> Option<String> {
    let first = body.get(0)?;
    let text = first
        .get("generated_text")
        .or_else(|| first.get("summary_text"))
        .or_else(|| first.get("text"))
        .and_then(|val| val.as_str())?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn extract_chat_content(body: &Value) -> Option<String> {
    let text = body
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|val| val.as_str())?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_generated_text_variants() {
        let shapes = [
            json!([{ "generated_text": "alpha" }]),
            json!([{ "summary_text": "beta" }]),
            json!([{ "text": "gamma" }]),
        ];
        let expected = ["alpha", "beta", "gamma"];
        for (shape, want) in shapes.iter().zip(expected) {
            assert_eq!(extract_generated_text(shape).as_deref(), Some(want));
        }
    }

    #[test]
    fn blank_or_missing_text_yields_none() {
        assert_eq!(extract_generated_text(&json!([])), None);
        assert_eq!(extract_generated_text(&json!([{ "generated_text": "  " }])), None);
        assert_eq!(extract_generated_text(&json!([{ "other": "x" }])), None);
        assert_eq!(extract_generated_text(&json!({ "generated_text": "x" })), None);
    }

    #[test]
    fn extracts_chat_completion_content() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "summary here" } }]
        });
        assert_eq!(extract_chat_content(&body).as_deref(), Some("summary here"));
        assert_eq!(extract_chat_content(&json!({ "choices": [] })), None);
    }
}
