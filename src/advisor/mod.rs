//! Advisor — the interior-design chat conversation.
//!
//! `transcript` is the data model, `profile` the persona configuration, and
//! `adapter` turns a transcript plus new input into the next model turn.

pub mod adapter;
pub mod profile;
pub mod transcript;

pub use adapter::ConversationAdapter;
pub use profile::AdvisorProfile;
pub use transcript::{ChatTurn, Transcript, TranscriptError};
