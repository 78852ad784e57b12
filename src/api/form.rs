//! Multipart form normalization for the turn endpoint
//!
//! Fields:
//! - `input`: a text value, or a file part holding recorded audio
//! - `message` (repeatable): JSON `{ "role": "user" | "assistant", "content": "..." }`
//!
//! Unknown fields are ignored.

use axum::extract::Multipart;
use axum::extract::multipart::Field;

use crate::conversation::{ConversationMessage, TurnInput};
use crate::turn::TurnError;

/// Content type assumed for audio parts that do not declare one
const DEFAULT_AUDIO_TYPE: &str = "application/octet-stream";

/// A validated turn payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnForm {
    pub input: TurnInput,
    pub history: Vec<ConversationMessage>,
}

impl TurnForm {
    /// Read and validate every field of the form
    ///
    /// # Errors
    ///
    /// Returns `TurnError::InvalidRequest` if the stream is malformed,
    /// `input` is missing or repeated, or any `message` is invalid
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, TurnError> {
        let mut input = None;
        let mut history = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::debug!(error = %e, "malformed multipart body");
            TurnError::InvalidRequest
        })? {
            let name = field.name().map(ToString::to_string);
            match name.as_deref() {
                Some("input") => {
                    if input.is_some() {
                        tracing::debug!("duplicate input field");
                        return Err(TurnError::InvalidRequest);
                    }
                    input = Some(read_input(field).await?);
                }
                Some("message") => {
                    let raw = field.text().await.map_err(|e| {
                        tracing::debug!(error = %e, "unreadable message field");
                        TurnError::InvalidRequest
                    })?;
                    let message = ConversationMessage::from_json(&raw).map_err(|e| {
                        tracing::debug!(error = %e, "invalid message field");
                        TurnError::InvalidRequest
                    })?;
                    history.push(message);
                }
                _ => {}
            }
        }

        let Some(input) = input else {
            tracing::debug!("missing input field");
            return Err(TurnError::InvalidRequest);
        };

        Ok(Self { input, history })
    }
}

/// Classify and read the `input` part
///
/// File parts and parts with a non-text content type are audio.
async fn read_input(field: Field<'_>) -> Result<TurnInput, TurnError> {
    let content_type = field.content_type().map(ToString::to_string);
    let is_audio = field.file_name().is_some()
        || content_type
            .as_deref()
            .is_some_and(|ct| !ct.starts_with("text/"));

    if is_audio {
        let data = field.bytes().await.map_err(|e| {
            tracing::debug!(error = %e, "unreadable audio input");
            TurnError::InvalidRequest
        })?;
        Ok(TurnInput::Audio {
            data: data.to_vec(),
            content_type: content_type.unwrap_or_else(|| DEFAULT_AUDIO_TYPE.to_string()),
        })
    } else {
        let text = field.text().await.map_err(|e| {
            tracing::debug!(error = %e, "unreadable text input");
            TurnError::InvalidRequest
        })?;
        Ok(TurnInput::Text(text))
    }
}
