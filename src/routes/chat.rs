//! Chat API routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::advisor::{ChatTurn, Transcript};
use crate::error::ApiError;
use crate::services::chat::{self, ChatError, SendOutcome};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub transcript: Transcript,
}

#[derive(Serialize)]
pub struct ReplyResponse {
    pub reply: ChatTurn,
}

#[derive(Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct AdviceBody {
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// `POST /api/chat/sessions` — start a conversation.
pub async fn create_session(State(state): State<AppState>) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let (session_id, transcript) = chat::create_session(&state)
        .await
        .map_err(chat_error_to_api)?;
    Ok((StatusCode::CREATED, Json(SessionResponse { session_id, transcript })))
}

/// `GET /api/chat/sessions/:id` — current transcript.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionResponse>, ApiError> {
    let transcript = chat::get_transcript(&state, session_id)
        .await
        .map_err(chat_error_to_api)?;
    Ok(Json(SessionResponse { session_id, transcript }))
}

/// `DELETE /api/chat/sessions/:id` — end the conversation.
pub async fn end_session(State(state): State<AppState>, Path(session_id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    chat::end_session(&state, session_id)
        .await
        .map_err(chat_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/chat/sessions/:id/messages` — submit text and/or a photo.
pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<MessageBody>,
) -> Result<Response, ApiError> {
    let outcome = chat::send_message(&state, session_id, &body.text, body.image.as_deref())
        .await
        .map_err(chat_error_to_api)?;
    Ok(match outcome {
        SendOutcome::Ignored => StatusCode::NO_CONTENT.into_response(),
        SendOutcome::Replied(reply) => Json(ReplyResponse { reply }).into_response(),
    })
}

/// `POST /api/chat/advice` — one-shot reply for a caller-held transcript.
pub async fn post_advice(State(state): State<AppState>, Json(body): Json<AdviceBody>) -> Result<Response, ApiError> {
    let outcome = chat::advise(&state, &body.history, &body.text, body.image.as_deref())
        .await
        .map_err(chat_error_to_api)?;
    Ok(match outcome {
        SendOutcome::Ignored => StatusCode::NO_CONTENT.into_response(),
        SendOutcome::Replied(reply) => Json(reply).into_response(),
    })
}

pub(crate) fn chat_error_to_api(err: ChatError) -> ApiError {
    let status = match &err {
        ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ChatError::Busy(_) => StatusCode::CONFLICT,
        ChatError::TooManySessions { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ChatError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        ChatError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ChatError::Transcript(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    ApiError::new(status, &err)
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;
