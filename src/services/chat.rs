//! Chat service — session lifecycle and message submission.
//!
//! DESIGN
//! ======
//! Sessions own their transcript; the adapter only reads it. A submission
//! marks the session in flight, appends the user turn, releases the lock,
//! and runs the generator call on its own task so a dropped HTTP request
//! cannot strand the session half-answered. The reply is appended and the
//! flag cleared when that task finishes.
//!
//! Empty submissions (blank text, no image) are ignored without touching
//! the transcript or calling the generator.
//!
//! Idle sessions are dropped by a background reaper. Sessions with a
//! submission in flight are never reaped.

use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::advisor::{ChatTurn, Transcript, TranscriptError};
use crate::llm::config::env_parse;
use crate::state::{AppState, Session};

const DEFAULT_CHAT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_CHAT_SESSION_IDLE_SECS: u64 = 1800;
const DEFAULT_CHAT_SESSION_SWEEP_SECS: u64 = 60;
const DEFAULT_CHAT_MAX_SESSIONS: usize = 1000;

// =============================================================================
// CONFIG
// =============================================================================

/// Limits for chat sessions, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatConfig {
    /// Largest accepted image after base64 decoding.
    pub max_image_bytes: usize,
    /// Sessions untouched this long are dropped.
    pub session_idle: Duration,
    /// How often the reaper runs.
    pub sweep_interval: Duration,
    /// Live sessions allowed at once; creation past this is refused.
    pub max_sessions: usize,
}

impl ChatConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            max_image_bytes: env_parse("CHAT_MAX_IMAGE_BYTES", DEFAULT_CHAT_MAX_IMAGE_BYTES),
            session_idle: Duration::from_secs(env_parse("CHAT_SESSION_IDLE_SECS", DEFAULT_CHAT_SESSION_IDLE_SECS)),
            sweep_interval: Duration::from_secs(
                env_parse("CHAT_SESSION_SWEEP_SECS", DEFAULT_CHAT_SESSION_SWEEP_SECS).max(1),
            ),
            max_sessions: env_parse("CHAT_MAX_SESSIONS", DEFAULT_CHAT_MAX_SESSIONS),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_CHAT_MAX_IMAGE_BYTES,
            session_idle: Duration::from_secs(DEFAULT_CHAT_SESSION_IDLE_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_CHAT_SESSION_SWEEP_SECS),
            max_sessions: DEFAULT_CHAT_MAX_SESSIONS,
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("session {0} already has a message in flight")]
    Busy(Uuid),
    #[error("too many live sessions (limit {limit})")]
    TooManySessions { limit: usize },
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("image too large: {bytes} bytes (limit {limit})")]
    ImageTooLarge { bytes: usize, limit: usize },
    #[error("transcript error: {0}")]
    Transcript(#[from] TranscriptError),
}

impl crate::error::ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SessionNotFound(_) => "E_SESSION_NOT_FOUND",
            Self::Busy(_) => "E_SESSION_BUSY",
            Self::TooManySessions { .. } => "E_TOO_MANY_SESSIONS",
            Self::InvalidImage(_) => "E_INVALID_IMAGE",
            Self::ImageTooLarge { .. } => "E_IMAGE_TOO_LARGE",
            Self::Transcript(_) => "E_TRANSCRIPT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Busy(_) | Self::TooManySessions { .. })
    }
}

/// What a submission produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank text and no image: nothing happened.
    Ignored,
    /// The model turn appended to the transcript.
    Replied(ChatTurn),
}

// =============================================================================
// SESSIONS
// =============================================================================

/// Start a conversation seeded with the profile greeting.
///
/// # Errors
///
/// Returns [`ChatError::TooManySessions`] once `max_sessions` are live.
pub async fn create_session(state: &AppState) -> Result<(Uuid, Transcript), ChatError> {
    let id = Uuid::new_v4();
    let session = Session::new(state.adapter.profile().greeting.clone());
    let transcript = session.transcript.clone();
    {
        let mut sessions = state.sessions.write().await;
        let limit = state.chat.max_sessions;
        if sessions.len() >= limit {
            warn!(limit, "chat: session limit reached");
            return Err(ChatError::TooManySessions { limit });
        }
        sessions.insert(id, session);
    }
    info!(session_id = %id, "chat: session created");
    Ok((id, transcript))
}

/// Snapshot a session's transcript.
///
/// # Errors
///
/// Returns [`ChatError::SessionNotFound`] for unknown or expired sessions.
pub async fn get_transcript(state: &AppState, id: Uuid) -> Result<Transcript, ChatError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or(ChatError::SessionNotFound(id))?;
    session.touch();
    Ok(session.transcript.clone())
}

/// Discard a session and its transcript.
///
/// # Errors
///
/// Returns [`ChatError::SessionNotFound`] for unknown or expired sessions.
pub async fn end_session(state: &AppState, id: Uuid) -> Result<(), ChatError> {
    state
        .sessions
        .write()
        .await
        .remove(&id)
        .ok_or(ChatError::SessionNotFound(id))?;
    info!(session_id = %id, "chat: session ended");
    Ok(())
}

// =============================================================================
// SUBMISSION
// =============================================================================

/// Submit user input to a session and wait for the model turn.
///
/// # Errors
///
/// Returns [`ChatError::SessionNotFound`] if the session is unknown or ended
/// while the reply was generated, [`ChatError::Busy`] while a previous
/// submission is still in flight, and an image error for payloads that are
/// not base64 or exceed the configured size.
pub async fn send_message(
    state: &AppState,
    id: Uuid,
    text: &str,
    image: Option<&str>,
) -> Result<SendOutcome, ChatError> {
    let image = accept_image(state, image)?;
    let has_image = image.is_some();
    // Text-only profiles never send photos upstream, so none is recorded.
    let image = image.filter(|_| state.adapter.profile().supports_image);

    let (prior, user_text) = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or(ChatError::SessionNotFound(id))?;

        if text.trim().is_empty() && !has_image {
            return Ok(SendOutcome::Ignored);
        }
        if session.in_flight {
            return Err(ChatError::Busy(id));
        }

        let prior = session.transcript.turns().to_vec();
        let user_text = state.adapter.user_text(text, has_image);
        session
            .transcript
            .push(ChatTurn::user(user_text.clone(), image.clone()))?;
        session.in_flight = true;
        session.touch();
        (prior, user_text)
    };

    info!(session_id = %id, text_len = text.len(), has_image, "chat: message received");

    let task_state = state.clone();
    let task: JoinHandle<Result<ChatTurn, ChatError>> = tokio::spawn(async move {
        let reply = task_state
            .adapter
            .submit(&prior, &user_text, image.as_deref())
            .await;
        append_reply(&task_state, id, reply.clone()).await?;
        Ok::<_, ChatError>(reply)
    });

    match task.await {
        Ok(result) => result.map(SendOutcome::Replied),
        Err(e) => {
            warn!(session_id = %id, error = %e, "chat: generation task aborted");
            let fallback = ChatTurn::model(state.adapter.profile().fallback_text.clone(), Vec::new());
            append_reply(state, id, fallback.clone()).await?;
            Ok(SendOutcome::Replied(fallback))
        }
    }
}

/// Answer a caller-owned transcript without a server-side session.
///
/// # Errors
///
/// Returns an image error for payloads that are not base64 or exceed the
/// configured size, whether attached now or carried in `history`.
pub async fn advise(
    state: &AppState,
    history: &[ChatTurn],
    text: &str,
    image: Option<&str>,
) -> Result<SendOutcome, ChatError> {
    let image = accept_image(state, image)?;
    let has_image = image.is_some();
    if text.trim().is_empty() && !has_image {
        return Ok(SendOutcome::Ignored);
    }

    let supports_image = state.adapter.profile().supports_image;
    let image = image.filter(|_| supports_image);
    let history = history
        .iter()
        .map(|turn| -> Result<ChatTurn, ChatError> {
            let image = if supports_image { accept_image(state, turn.image.as_deref())? } else { None };
            Ok(ChatTurn { image, ..turn.clone() })
        })
        .collect::<Result<Vec<_>, ChatError>>()?;

    let user_text = state.adapter.user_text(text, has_image);
    let reply = state
        .adapter
        .submit(&history, &user_text, image.as_deref())
        .await;
    Ok(SendOutcome::Replied(reply))
}

async fn append_reply(state: &AppState, id: Uuid, reply: ChatTurn) -> Result<(), ChatError> {
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&id) else {
        info!(session_id = %id, "chat: session ended before reply, dropping it");
        return Err(ChatError::SessionNotFound(id));
    };
    session.in_flight = false;
    session.touch();
    if session.transcript.awaiting_reply() {
        session.transcript.push(reply)?;
    }
    Ok(())
}

// =============================================================================
// IMAGES
// =============================================================================

/// Normalize an optional upload; blank strings count as no image.
fn accept_image(state: &AppState, raw: Option<&str>) -> Result<Option<String>, ChatError> {
    raw.filter(|raw| !raw.trim().is_empty())
        .map(|raw| normalize_image(raw, state.chat.max_image_bytes))
        .transpose()
}

/// Reduce an uploaded image to a bare base64 payload.
///
/// Accepts raw base64 or a `data:<mime>;base64,<payload>` URL as produced by
/// the browser file reader. The payload must decode and stay within `limit`
/// bytes once decoded.
///
/// # Errors
///
/// Returns [`ChatError::InvalidImage`] for non-base64 input and
/// [`ChatError::ImageTooLarge`] above the limit.
pub fn normalize_image(raw: &str, limit: usize) -> Result<String, ChatError> {
    let trimmed = raw.trim();
    let payload = match trimmed.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest
                .split_once(',')
                .ok_or_else(|| ChatError::InvalidImage("data URL has no payload".into()))?;
            if !meta.ends_with(";base64") {
                return Err(ChatError::InvalidImage("data URL is not base64-encoded".into()));
            }
            data
        }
        None => trimmed,
    };

    let decoded = STANDARD
        .decode(payload)
        .map_err(|e| ChatError::InvalidImage(e.to_string()))?;
    if decoded.is_empty() {
        return Err(ChatError::InvalidImage("empty payload".into()));
    }
    if decoded.len() > limit {
        return Err(ChatError::ImageTooLarge { bytes: decoded.len(), limit });
    }
    Ok(payload.to_string())
}

// =============================================================================
// REAPER
// =============================================================================

/// Drop sessions idle for at least `idle` as of `now`. Returns how many were dropped.
pub async fn reap_idle_sessions(state: &AppState, now: Instant, idle: Duration) -> usize {
    let mut sessions = state.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|_, s| s.in_flight || now.saturating_duration_since(s.last_active) < idle);
    before - sessions.len()
}

/// Spawn the background idle-session reaper. Returns a handle for shutdown.
pub fn spawn_session_reaper(state: AppState) -> JoinHandle<()> {
    let ChatConfig { session_idle, sweep_interval, .. } = state.chat;
    info!(
        idle_secs = session_idle.as_secs(),
        sweep_secs = sweep_interval.as_secs(),
        "chat: session reaper configured"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let dropped = reap_idle_sessions(&state, Instant::now(), session_idle).await;
            if dropped > 0 {
                info!(dropped, "chat: idle sessions reaped");
            }
        }
    })
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
