//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the conversation adapter and a map of live chat sessions. Each
//! session owns its transcript plus the in-flight flag that keeps one
//! submission per conversation at a time. Nothing here is persisted.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::advisor::{ConversationAdapter, Transcript};
use crate::services::chat::ChatConfig;

// =============================================================================
// SESSION
// =============================================================================

/// Per-visitor conversation. Dropped on explicit end or idle expiry.
pub struct Session {
    pub transcript: Transcript,
    /// A submission is waiting on the generator.
    pub in_flight: bool,
    /// Last time the session was created, read, or written.
    pub last_active: Instant,
}

impl Session {
    #[must_use]
    pub fn new(greeting: impl Into<String>) -> Self {
        Self { transcript: Transcript::new(greeting), in_flight: false, last_active: Instant::now() }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<ConversationAdapter>,
    pub sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    pub chat: ChatConfig,
}

impl AppState {
    #[must_use]
    pub fn new(adapter: ConversationAdapter, chat: ChatConfig) -> Self {
        Self { adapter: Arc::new(adapter), sessions: Arc::new(RwLock::new(HashMap::new())), chat }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
