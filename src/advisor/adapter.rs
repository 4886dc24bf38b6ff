//! Conversation adapter — transcript in, exactly one model turn out.
//!
//! DESIGN
//! ======
//! `submit` maps the caller's transcript onto provider turns, appends the
//! current user turn, makes one `generate` call, and folds the result back
//! into a `ChatTurn`. It never fails: generator errors become the profile's
//! fallback text and are reported to the injected `Diagnostics` sink, so a
//! user turn is always answered by exactly one model turn.
//!
//! The adapter holds no conversation state and never mutates the
//! transcript; the caller appends the returned turn.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::profile::AdvisorProfile;
use super::transcript::{ChatTurn, Citation};
use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{ChatResponse, GenerationOptions, GroundingChunk, LlmError, Part, Role, Turn};

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// Receives the failures the adapter swallows.
pub trait Diagnostics: Send + Sync {
    /// The generator call failed; the user sees the fallback text.
    fn generation_failed(&self, err: &LlmError);

    /// The generator succeeded without any text.
    fn generation_empty(&self, _response: &ChatResponse) {}
}

/// Default sink: structured log lines.
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn generation_failed(&self, err: &LlmError) {
        error!(error = %err, code = err.error_code(), retryable = err.retryable(), "advisor: generation failed");
    }

    fn generation_empty(&self, response: &ChatResponse) {
        warn!(
            model = %response.model,
            finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
            "advisor: generation returned no text"
        );
    }
}

// =============================================================================
// ADAPTER
// =============================================================================

pub struct ConversationAdapter {
    llm: Arc<dyn LlmChat>,
    profile: AdvisorProfile,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ConversationAdapter {
    pub fn new(llm: Arc<dyn LlmChat>, profile: AdvisorProfile) -> Self {
        Self { llm, profile, diagnostics: Arc::new(TracingDiagnostics) }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn profile(&self) -> &AdvisorProfile {
        &self.profile
    }

    /// The text recorded and sent for a submission: the typed text, or the
    /// placeholder prompt when only a photo was attached.
    #[must_use]
    pub fn user_text(&self, text: &str, has_image: bool) -> String {
        if text.trim().is_empty() && has_image {
            self.profile.placeholder_prompt.clone()
        } else {
            text.to_string()
        }
    }

    /// Ask the generator for the next model turn.
    ///
    /// The caller gates empty submissions (blank text and no image) and must
    /// not run two submissions of one conversation concurrently.
    pub async fn submit(&self, transcript: &[ChatTurn], new_text: &str, new_image: Option<&str>) -> ChatTurn {
        let history = build_history(&self.profile, transcript);
        let current = build_current_turn(&self.profile, &self.user_text(new_text, new_image.is_some()), new_image);
        let options = GenerationOptions {
            system_instruction: self.profile.system_instruction.clone(),
            temperature: self.profile.temperature,
            web_search: self.profile.supports_grounding,
        };

        info!(
            profile = self.profile.name,
            history_len = history.len(),
            has_image = current.parts.len() > 1,
            "advisor: generating"
        );

        match self.llm.generate(&history, &current, &options).await {
            Ok(response) => self.reply_from(response),
            Err(err) => {
                self.diagnostics.generation_failed(&err);
                ChatTurn::model(self.profile.fallback_text.clone(), Vec::new())
            }
        }
    }

    fn reply_from(&self, response: ChatResponse) -> ChatTurn {
        let citations = normalize_citations(&response.grounding_chunks);
        info!(
            model = %response.model,
            citations = citations.len(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "advisor: reply"
        );

        match response.text.as_deref().filter(|t| !t.is_empty()) {
            Some(text) => ChatTurn::model(text, citations),
            None => {
                self.diagnostics.generation_empty(&response);
                ChatTurn::model(self.profile.unprocessable_text.clone(), citations)
            }
        }
    }
}

// =============================================================================
// MAPPING
// =============================================================================

/// Prior turns as provider turns: `[image?, text]` per turn.
fn build_history(profile: &AdvisorProfile, transcript: &[ChatTurn]) -> Vec<Turn> {
    transcript
        .iter()
        .map(|turn| {
            let mut parts = Vec::with_capacity(2);
            if profile.supports_image {
                if let Some(image) = &turn.image {
                    parts.push(Part::jpeg(image.clone()));
                }
            }
            parts.push(Part::text(turn.text.clone()));
            Turn { role: turn.role, parts }
        })
        .collect()
}

/// The new user turn: `[text, image?]`.
fn build_current_turn(profile: &AdvisorProfile, text: &str, image: Option<&str>) -> Turn {
    let mut parts = vec![Part::text(text)];
    if profile.supports_image {
        if let Some(image) = image {
            parts.push(Part::jpeg(image));
        }
    }
    Turn { role: Role::User, parts }
}

/// Keep chunks that carry a web record with both title and URI, in order.
fn normalize_citations(chunks: &[GroundingChunk]) -> Vec<Citation> {
    chunks
        .iter()
        .filter_map(|chunk| {
            let web = chunk.web.as_ref()?;
            Some(Citation { title: web.title.clone()?, uri: web.uri.clone()? })
        })
        .collect()
}

#[cfg(test)]
#[path = "adapter_test.rs"]
mod tests;
