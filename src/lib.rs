//! Parley - voice turn gateway for spoken English conversation practice
//!
//! Each request is one conversation turn:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  POST /api  (multipart: input + message history)     │
//! └────────────────────────┬─────────────────────────────┘
//!                          │
//! ┌────────────────────────▼─────────────────────────────┐
//! │                    Turn Handler                       │
//! │   Transcribe  ──►  Respond  ──►  Synthesize          │
//! └────────┬───────────────┬───────────────┬─────────────┘
//!          │               │               │
//! ┌────────▼─────┐  ┌──────▼───────┐  ┌────▼───────────┐
//! │ Whisper /    │  │ Chat         │  │ OpenAI /       │
//! │ Deepgram     │  │ completions  │  │ ElevenLabs     │
//! └──────────────┘  └──────────────┘  └────────────────┘
//! ```
//!
//! The server keeps no conversation state; callers resend history every turn.

pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod locale;
pub mod prompt;
pub mod turn;
pub mod voice;

pub use api::{ApiServer, ApiServerBuilder, ApiState};
pub use config::Config;
pub use conversation::{ConversationMessage, Role, TurnInput};
pub use error::{Error, Result};
pub use llm::{ChatCompletion, ChatMessage, ChatModel, ChatRole};
pub use locale::RequestLocale;
pub use turn::{TurnError, TurnHandler, TurnReply, TurnRequest};
pub use voice::{SpeechRecognizer, SpeechSynthesizer, SpeechToText, TextToSpeech};
