//! Speech collaborators
//!
//! Transcription and synthesis are reached through the `SpeechRecognizer`
//! and `SpeechSynthesizer` traits so the turn handler can be driven by
//! hosted providers or by test doubles.

mod stt;
mod tts;
mod wav;

use async_trait::async_trait;

pub use stt::{DEEPGRAM_BASE_URL, SpeechToText};
pub use tts::{ELEVENLABS_BASE_URL, TextToSpeech};
pub use wav::{PCM_SAMPLE_RATE, pcm16_to_wav};

use crate::Result;

/// Turns recorded audio into text
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe `audio`, encoded as `content_type`
    async fn transcribe(&self, audio: &[u8], content_type: &str) -> Result<String>;

    /// Provider name, for logging and readiness reporting
    fn name(&self) -> &'static str;
}

/// Turns reply text into WAV audio
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into a complete WAV (linear PCM) buffer
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    /// Provider name, for logging and readiness reporting
    fn name(&self) -> &'static str;
}
