//! Conversation data model: turns, citations, and the append-only transcript.

use serde::{Deserialize, Serialize};

use crate::llm::types::Role;

/// A web reference backing a model answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// One message in the conversation as the widget renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    #[serde(default)]
    pub text: String,
    /// Base64 image payload, user turns only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Grounding references, model turns only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>, image: Option<String>) -> Self {
        Self { role: Role::User, text: text.into(), image, citations: Vec::new() }
    }

    pub fn model(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self { role: Role::Model, text: text.into(), image: None, citations }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    #[error("turn out of order: expected a {expected} turn, got {got}")]
    OutOfOrder { expected: &'static str, got: &'static str },
}

impl crate::error::ErrorCode for TranscriptError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfOrder { .. } => "E_TRANSCRIPT_ORDER",
        }
    }
}

/// Ordered conversation history. Starts with a model greeting and
/// alternates user/model from there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    #[must_use]
    pub fn new(greeting: impl Into<String>) -> Self {
        Self { turns: vec![ChatTurn::model(greeting, Vec::new())] }
    }

    #[must_use]
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// `true` when the last turn is a user turn still waiting for its reply.
    #[must_use]
    pub fn awaiting_reply(&self) -> bool {
        self.last().is_some_and(|t| t.role == Role::User)
    }

    /// Append a turn, enforcing user/model alternation.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::OutOfOrder`] when `turn` has the same role as
    /// the current last turn.
    pub fn push(&mut self, turn: ChatTurn) -> Result<(), TranscriptError> {
        let expected = if self.awaiting_reply() { Role::Model } else { Role::User };
        if turn.role != expected {
            return Err(TranscriptError::OutOfOrder { expected: expected.as_str(), got: turn.role.as_str() });
        }
        self.turns.push(turn);
        Ok(())
    }
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;
