//! Tutor configuration structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! The order of `TutorConfig::providers` is the failover priority order:
//! the first entry is the primary backend, subsequent entries are tried only
//! after the primary is judged unhealthy.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ProviderKind
// ---------------------------------------------------------------------------

/// Selects the wire format a provider speaks.
///
/// Different vendors return differently-shaped success bodies; the kind
/// decides which client adapter is built for the entry
/// (`choices[0].message.content` vs `candidates[0].content.parts[0].text`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Any OpenAI-compatible `/v1/chat/completions` endpoint
    /// (OpenAI, Groq, Together.ai, LM Studio, Ollama in OpenAI mode …).
    OpenAiCompatible,
    /// Google Gemini `generateContent` endpoint (AI Studio keys).
    Gemini,
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::OpenAiCompatible
    }
}

// ---------------------------------------------------------------------------
// ProviderConfig
// ---------------------------------------------------------------------------

/// Settings for a single text-generation backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name used in logs and `provider_used` tags (e.g. `"gemini"`).
    pub name: String,
    /// Wire format spoken by the endpoint.
    pub kind: ProviderKind,
    /// Base URL of the API endpoint.
    ///
    /// - OpenAI: `https://api.openai.com`
    /// - Gemini: `https://generativelanguage.googleapis.com`
    pub base_url: String,
    /// API key — `None` for local providers that need no authentication.
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is `None`, so keys can
    /// stay out of the settings file (e.g. `"GEMINI_API_KEY"`).
    pub api_key_env: Option<String>,
    /// Model identifier sent to the API (e.g. `"gemini-2.0-flash"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).  Lower = more deterministic.
    pub temperature: f32,
}

impl ProviderConfig {
    /// Resolve the API key: the literal `api_key` wins, otherwise the
    /// variable named by `api_key_env` is read from the environment.
    ///
    /// Returns `None` when neither yields a non-empty string.
    pub fn resolved_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: "gemini".into(),
            kind: ProviderKind::Gemini,
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            api_key_env: Some("GEMINI_API_KEY".into()),
            model: "gemini-2.0-flash".into(),
            temperature: 0.3,
        }
    }
}

// ---------------------------------------------------------------------------
// FailoverConfig
// ---------------------------------------------------------------------------

/// Failover and rate-limit policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailoverConfig {
    /// Consecutive failures after which a provider is demoted (skipped in
    /// candidate selection until it records a success).
    pub failure_threshold: u32,
    /// Minimum milliseconds between any two outbound calls — one shared
    /// limiter across all providers bounds the total call rate.
    pub min_interval_ms: u64,
}

impl Default for FailoverConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 2,
            min_interval_ms: 1_000,
        }
    }
}

// ---------------------------------------------------------------------------
// TimeoutConfig
// ---------------------------------------------------------------------------

/// Per-call network timeouts.
///
/// The conversational call gets a generous timeout; the grammar analysis and
/// correction calls are best-effort side channels and get a short one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout in seconds for the main tutor reply.
    pub chat_secs: u64,
    /// Timeout in seconds for analysis / correction calls.
    pub analysis_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            chat_secs: 60,
            analysis_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// TutorConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level tutor configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use lingo_tutor::config::TutorConfig;
///
/// // Load (returns Default when file is missing)
/// let config = TutorConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Backends in priority order; index 0 is the primary.
    pub providers: Vec<ProviderConfig>,
    /// Failover / rate-limit policy.
    pub failover: FailoverConfig,
    /// Network timeouts.
    pub timeouts: TimeoutConfig,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderConfig::default()],
            failover: FailoverConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl TutorConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(TutorConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
