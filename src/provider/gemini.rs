//! Google Gemini provider adapter.
//!
//! `GeminiClient` calls the AI Studio `generateContent` endpoint, which
//! returns its reply at `candidates[0].content.parts[0].text` — a different
//! success shape from the OpenAI wire format, normalized here so the rest of
//! the system never sees it.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::provider::client::{ProviderError, TextProvider};

/// Calls the Gemini `v1beta` `generateContent` endpoint.
///
/// The API key travels as a query parameter (`?key=…`), not a header — the
/// AI Studio convention for free-tier keys.
pub struct GeminiClient {
    client: reqwest::Client,
    name: String,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    /// Build a client from a provider config entry.
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

    fn endpoint(&self) -> String {
        let mut url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            url.push_str("?key=");
            url.push_str(key);
        }
        url
    }
}

#[async_trait]
impl TextProvider for GeminiClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "contents": [ { "parts": [ { "text": prompt } ] } ],
            "generationConfig": { "temperature": self.temperature },
        });

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .timeout(timeout)
            .send()
            .await?;

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
            .ok_or_else(|| ProviderError::Shape("missing candidates[0].content.parts[0].text".into()))
    }
}

/// Extract the reply text from a `generateContent` success body.
fn reply_text(json: &serde_json::Value) -> Option<&str> {
    let text = json["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()?
        .trim();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
