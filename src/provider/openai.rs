//! OpenAI-compatible provider adapter.
//!
//! `OpenAiClient` calls any `/v1/chat/completions` endpoint — OpenAI, Groq,
//! Together.ai, LM Studio, vLLM, Ollama in OpenAI mode.  All connection
//! details come from [`ProviderConfig`]; nothing is hardcoded.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::provider::client::{ProviderError, TextProvider};

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The success body is expected to carry the reply text at
/// `choices[0].message.content`; everything else in the response is opaque.
pub struct OpenAiClient {
    client: reqwest::Client,
    name: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    /// Build a client from a provider config entry.
    ///
    /// Per-request timeouts are passed to [`TextProvider::generate`], so the
    /// underlying HTTP client itself carries no timeout.
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            name: config.name.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl TextProvider for OpenAiClient {
    fn name(&self) -> &str {
        &self.name
    }

    /// Send `prompt` as a single user message.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when a
    /// non-empty API key resolved at construction time — safe for Ollama and
    /// other local providers that require no authentication.
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = serde_json::json!({
            "model":       self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "stream":      false,
            "temperature": self.temperature,
        });

        let mut req = self.client.post(&url).json(&body).timeout(timeout);
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                code: status.as_u16(),
                body: body.chars().take(180).collect(),
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Shape(e.to_string()))?;

        reply_text(&json)
            .map(str::to_string)
            .ok_or_else(|| ProviderError::Shape("missing choices[0].message.content".into()))
    }
}

/// Extract the reply text from a chat-completions success body.
///
/// Returns `None` when the expected field is missing or the text is empty
/// after trimming.
fn reply_text(json: &serde_json::Value) -> Option<&str> {
    let text = json["choices"][0]["message"]["content"].as_str()?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
