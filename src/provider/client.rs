//! Core `TextProvider` trait and provider construction.
//!
//! Every backend adapter normalizes its vendor-specific response shape into a
//! plain reply string, so the failover layer and the orchestrator only ever
//! reason about `Result<String, ProviderError>`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};
use crate::provider::gemini::GeminiClient;
use crate::provider::openai::OpenAiClient;

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

/// Typed failure of a single provider call.
///
/// All failure paths are represented as values, never panics, so the
/// failover controller can reason about them uniformly.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned status {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("provider request timed out")]
    Timeout,

    /// HTTP transport or connection error.
    #[error("provider request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape (missing fields,
    /// empty text, not JSON at all).
    #[error("unexpected provider response shape: {0}")]
    Shape(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TextProvider trait
// ---------------------------------------------------------------------------

/// Async trait implemented by every text-generation backend.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks as
/// `Arc<dyn TextProvider>`.
///
/// # Arguments
/// * `prompt`  – Full prompt text to send.
/// * `timeout` – Per-request deadline; a hung remote call is bounded only by
///               this value (there is no cancellation mechanism).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Stable name used in logs and `provider_used` tags.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError>;
}

/// Build the adapter matching the entry's [`ProviderKind`].
pub fn build_provider(config: &ProviderConfig) -> Arc<dyn TextProvider> {
    match config.kind {
        ProviderKind::OpenAiCompatible => Arc::new(OpenAiClient::from_config(config)),
        ProviderKind::Gemini => Arc::new(GeminiClient::from_config(config)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[test]
    fn build_provider_picks_adapter_by_kind() {
        let gemini = ProviderConfig::default();
        assert_eq!(build_provider(&gemini).name(), "gemini");

        let openai = ProviderConfig {
            name: "groq".into(),
            kind: ProviderKind::OpenAiCompatible,
            base_url: "https://api.groq.com/openai".into(),
            ..ProviderConfig::default()
        };
        assert_eq!(build_provider(&openai).name(), "groq");
    }

    #[test]
    fn error_display_is_stable() {
        let err = ProviderError::Status {
            code: 429,
            body: "quota exceeded".into(),
        };
        assert_eq!(
            err.to_string(),
            "provider returned status 429: quota exceeded"
        );
        assert_eq!(
            ProviderError::Timeout.to_string(),
            "provider request timed out"
        );
    }
}
