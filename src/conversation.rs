//! Request-scoped conversation types
//!
//! Nothing here outlives a single turn. Conversation state lives entirely in
//! the history the caller resends with every request.

use serde::{Deserialize, Serialize};

/// Speaker of a prior conversation message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat-completion APIs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One prior turn supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    /// Parse a single JSON-encoded `message` form value
    ///
    /// # Errors
    ///
    /// Returns error if the value is not an object with a `content` string
    /// and a `role` of `user` or `assistant`
    pub fn from_json(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// The user's input for this turn: typed text or recorded audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnInput {
    Text(String),
    Audio {
        data: Vec<u8>,
        /// MIME type reported by the client, used as the transcription format hint
        content_type: String,
    },
}

impl TurnInput {
    /// Whether this input needs a transcription call
    #[must_use]
    pub const fn is_audio(&self) -> bool {
        matches!(self, Self::Audio { .. })
    }
}
