//! Text-generation provider layer.
//!
//! This module provides:
//! * [`TextProvider`] — async trait implemented by all backend adapters.
//! * [`OpenAiClient`] — OpenAI-compatible chat-completions adapter.
//! * [`GeminiClient`] — Google Gemini `generateContent` adapter.
//! * [`RateLimiter`] — shared minimum-interval limiter for outbound calls.
//! * [`FailoverController`] — priority-ordered provider selection with
//!   consecutive-failure demotion and a single failover hop per call.
//! * [`ProviderError`] / [`FailoverError`] — typed failure values.

pub mod client;
pub mod failover;
pub mod gemini;
pub mod limiter;
pub mod openai;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{build_provider, ProviderError, TextProvider};
pub use failover::{FailoverController, FailoverError, Generation};
pub use gemini::GeminiClient;
pub use limiter::RateLimiter;
pub use openai::OpenAiClient;
