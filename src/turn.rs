//! Turn handler: transcript, reply, and synthesized speech for one request
//!
//! ```text
//! TurnInput ──► transcribe ──► respond ──► synthesize ──► TurnReply
//!                   │              │            │
//!              Invalid audio   Reply failed  Synthesis failed
//! ```
//!
//! Each step depends on the previous one's output, so they run in order.
//! Collaborators are injected once at startup and shared across requests.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use thiserror::Error;

use crate::conversation::{ConversationMessage, TurnInput};
use crate::llm::ChatModel;
use crate::locale::RequestLocale;
use crate::prompt;
use crate::voice::{SpeechRecognizer, SpeechSynthesizer};

/// Everything the handler needs to run one turn
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub input: TurnInput,
    pub history: Vec<ConversationMessage>,
    pub locale: RequestLocale,
}

/// Result of a successful turn
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub transcript: String,
    pub reply: String,
    /// Complete WAV audio of `reply`
    pub audio: Vec<u8>,
}

/// Caller-visible turn failures
///
/// Display strings are the exact response bodies. Underlying causes are
/// logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnError {
    /// Payload did not match the form schema
    #[error("Invalid request")]
    InvalidRequest,

    /// Transcription failed or produced nothing
    #[error("Invalid audio")]
    InvalidAudio,

    /// Chat completion failed
    #[error("Reply generation failed")]
    CompletionFailed,

    /// Speech synthesis failed
    #[error("Voice synthesis failed")]
    SynthesisFailed,
}

/// Runs turns against injected speech and language collaborators
pub struct TurnHandler {
    recognizer: Arc<dyn SpeechRecognizer>,
    model: Arc<dyn ChatModel>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl TurnHandler {
    #[must_use]
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        model: Arc<dyn ChatModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            recognizer,
            model,
            synthesizer,
        }
    }

    /// Run a full turn
    ///
    /// # Errors
    ///
    /// Returns the first failing step as a `TurnError`
    pub async fn run(&self, request: TurnRequest) -> Result<TurnReply, TurnError> {
        let started = Instant::now();
        let TurnRequest {
            input,
            history,
            locale,
        } = request;

        let transcript = self
            .transcribe(input)
            .await
            .ok_or(TurnError::InvalidAudio)?;

        let reply = self
            .respond(&transcript, &history, &locale)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = self.model.model(), "chat completion failed");
                TurnError::CompletionFailed
            })?;

        let audio = self.synthesize(&reply).await.map_err(|e| {
            tracing::error!(error = %e, provider = self.synthesizer.name(), "voice synthesis failed");
            TurnError::SynthesisFailed
        })?;

        tracing::info!(
            history = history.len(),
            audio_bytes = audio.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "turn complete"
        );

        Ok(TurnReply {
            transcript,
            reply,
            audio,
        })
    }

    /// Produce the transcript for `input`
    ///
    /// Text passes through unchanged. Audio is transcribed and trimmed.
    /// Returns `None` for empty input, an empty transcription, or any
    /// transcription failure.
    pub async fn transcribe(&self, input: TurnInput) -> Option<String> {
        match input {
            TurnInput::Text(text) => (!text.is_empty()).then_some(text),
            TurnInput::Audio { data, content_type } => {
                if data.is_empty() {
                    tracing::warn!("empty audio upload");
                    return None;
                }

                match self.recognizer.transcribe(&data, &content_type).await {
                    Ok(text) => {
                        let trimmed = text.trim();
                        if trimmed.is_empty() {
                            tracing::warn!(provider = self.recognizer.name(), "empty transcription");
                            None
                        } else {
                            Some(trimmed.to_string())
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, provider = self.recognizer.name(), "transcription failed");
                        None
                    }
                }
            }
        }
    }

    /// Generate the assistant's reply to `transcript`
    ///
    /// # Errors
    ///
    /// Returns error if the chat-completion call fails
    pub async fn respond(
        &self,
        transcript: &str,
        history: &[ConversationMessage],
        locale: &RequestLocale,
    ) -> crate::Result<String> {
        let system = prompt::system_prompt(locale, Utc::now());
        let messages = prompt::build_messages(system, history, transcript);
        self.model.complete(&messages).await
    }

    /// Synthesize `reply` into WAV audio
    ///
    /// # Errors
    ///
    /// Returns error if the synthesis call fails
    pub async fn synthesize(&self, reply: &str) -> crate::Result<Vec<u8>> {
        self.synthesizer.synthesize(reply).await
    }

    /// Names of the configured collaborators, for readiness reporting
    #[must_use]
    pub fn backends(&self) -> (&'static str, &str, &'static str) {
        (
            self.recognizer.name(),
            self.model.model(),
            self.synthesizer.name(),
        )
    }
}
