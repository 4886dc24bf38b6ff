//! LLM — Gemini adapter for the design-advice chat.
//!
//! DESIGN
//! ======
//! Configuration comes from environment variables (`LlmConfig`). `LlmClient`
//! owns the HTTP client and the model name and implements `LlmChat`, the
//! seam the conversation adapter depends on. When no key is configured the
//! server runs with `UnconfiguredLlm`, which fails every call so replies
//! degrade to the fallback text instead of the server refusing to start.

pub mod config;
pub mod gemini;
pub mod types;

use config::LlmConfig;
pub use types::LlmChat;
use types::{ChatResponse, GenerationOptions, LlmError, Turn};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete LLM client backed by the Gemini `generateContent` API.
pub struct LlmClient {
    inner: gemini::GeminiClient,
    model: String,
}

impl LlmClient {
    /// Build an LLM client from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = gemini::GeminiClient::new(config.api_key, config.base_url, config.timeouts)?;
        Ok(Self { inner, model: config.model })
    }

    /// Return the configured model name (e.g. `"gemini-3-flash-preview"`).
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn generate(
        &self,
        history: &[Turn],
        current: &Turn,
        options: &GenerationOptions,
    ) -> Result<ChatResponse, LlmError> {
        self.inner
            .generate(&self.model, history, current, options)
            .await
    }
}

// =============================================================================
// UNCONFIGURED
// =============================================================================

/// Stand-in used when startup could not build an [`LlmClient`].
pub struct UnconfiguredLlm {
    reason: String,
}

impl UnconfiguredLlm {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait::async_trait]
impl LlmChat for UnconfiguredLlm {
    async fn generate(
        &self,
        _history: &[Turn],
        _current: &Turn,
        _options: &GenerationOptions,
    ) -> Result<ChatResponse, LlmError> {
        Err(LlmError::ConfigParse(format!("LLM not configured: {}", self.reason)))
    }
}
