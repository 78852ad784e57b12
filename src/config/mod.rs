//! Configuration management for the Parley gateway
//!
//! Every setting resolves as env > TOML file > default.

pub mod file;

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use secrecy::SecretString;

use crate::api::DEFAULT_MAX_UPLOAD_BYTES;
use crate::llm::{ChatCompletion, ChatModel};
use crate::voice::{SpeechRecognizer, SpeechSynthesizer, SpeechToText, TextToSpeech};
use crate::{Error, Result};

pub use file::ParleyConfigFile;

/// Default ElevenLabs voice ("Rachel")
const ELEVENLABS_DEFAULT_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";

/// Parley gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Chat-completion configuration
    pub llm: LlmConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// Provider-wide API keys, used when a stage has no key of its own
    pub api_keys: ApiKeys,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Global requests-per-minute limit (disabled when `None`)
    pub rate_limit_rpm: Option<u32>,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,
}

/// Speech-to-text backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SttBackend {
    /// Any OpenAI-compatible `/audio/transcriptions` endpoint
    Whisper,
    Deepgram,
}

impl FromStr for SttBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whisper" | "openai" | "groq" => Ok(Self::Whisper),
            "deepgram" => Ok(Self::Deepgram),
            other => Err(Error::Config(format!("unknown STT provider: {other}"))),
        }
    }
}

/// Text-to-speech backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsBackend {
    OpenAI,
    ElevenLabs,
}

impl FromStr for TtsBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "elevenlabs" => Ok(Self::ElevenLabs),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    pub provider: SttBackend,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
}

/// Chat-completion configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub max_tokens: u32,
}

/// Text-to-speech configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    pub provider: TtsBackend,
    pub model: String,
    pub voice: String,
    /// Speed multiplier (0.25 to 4.0, OpenAI only)
    pub speed: f64,
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper, chat, TTS)
    pub openai: Option<SecretString>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<SecretString>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<SecretString>,
}

impl Config {
    /// Load configuration from the environment and a TOML file
    ///
    /// An explicit `path` must exist and parse. Without one, the standard
    /// config path is read if present.
    ///
    /// # Errors
    ///
    /// Returns error if the explicit file is unreadable or a value is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = match path {
            Some(path) => file::load_from(path)?,
            None => file::load_config_file(),
        };
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if a provider name or numeric value is invalid
    pub fn from_sources(fc: ParleyConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret = |key: &str, fallback: Option<String>| {
            env(key)
                .or(fallback)
                .filter(|k| !k.is_empty())
                .map(SecretString::from)
        };

        let api_keys = ApiKeys {
            openai: secret("OPENAI_API_KEY", fc.api_keys.openai),
            deepgram: secret("DEEPGRAM_API_KEY", fc.api_keys.deepgram),
            elevenlabs: secret("ELEVENLABS_API_KEY", fc.api_keys.elevenlabs),
        };

        // Server config (env > toml > default)
        let server = ServerConfig {
            host: env("PARLEY_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: match parse_env(&env, "PARLEY_PORT")? {
                Some(port) => Some(port),
                None => parse_env(&env, "PORT")?,
            }
            .or(fc.server.port)
            .unwrap_or(3000),
            rate_limit_rpm: parse_env(&env, "PARLEY_RATE_LIMIT_RPM")?
                .or(fc.server.rate_limit_rpm)
                .filter(|rpm| *rpm > 0),
            max_upload_bytes: parse_env(&env, "PARLEY_MAX_UPLOAD_BYTES")?
                .or(fc.server.max_upload_bytes)
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        };

        let stt_provider = env("PARLEY_STT_PROVIDER")
            .or(fc.stt.provider)
            .map_or(Ok(SttBackend::Whisper), |p| p.parse())?;
        let default_stt_model = match stt_provider {
            SttBackend::Whisper => "whisper-1",
            SttBackend::Deepgram => "nova-2",
        };
        let stt = SttConfig {
            provider: stt_provider,
            model: env("PARLEY_STT_MODEL")
                .or(fc.stt.model)
                .unwrap_or_else(|| default_stt_model.to_string()),
            base_url: env("PARLEY_STT_BASE_URL").or(fc.stt.base_url),
            api_key: secret("PARLEY_STT_API_KEY", fc.stt.api_key),
        };

        let llm = LlmConfig {
            model: env("PARLEY_LLM_MODEL")
                .or(fc.llm.model)
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            base_url: env("PARLEY_LLM_BASE_URL").or(fc.llm.base_url),
            api_key: secret("PARLEY_LLM_API_KEY", fc.llm.api_key),
            max_tokens: parse_env(&env, "PARLEY_LLM_MAX_TOKENS")?
                .or(fc.llm.max_tokens)
                .unwrap_or(256),
        };

        let tts_provider = env("PARLEY_TTS_PROVIDER")
            .or(fc.tts.provider)
            .map_or(Ok(TtsBackend::OpenAI), |p| p.parse())?;
        let (default_model, default_voice) = match tts_provider {
            TtsBackend::OpenAI => ("tts-1", "alloy"),
            TtsBackend::ElevenLabs => ("eleven_turbo_v2", ELEVENLABS_DEFAULT_VOICE),
        };
        let tts = TtsConfig {
            provider: tts_provider,
            model: env("PARLEY_TTS_MODEL")
                .or(fc.tts.model)
                .unwrap_or_else(|| default_model.to_string()),
            voice: env("PARLEY_TTS_VOICE")
                .or(fc.tts.voice)
                .unwrap_or_else(|| default_voice.to_string()),
            speed: parse_env(&env, "PARLEY_TTS_SPEED")?
                .or(fc.tts.speed)
                .unwrap_or(1.0)
                .clamp(0.25, 4.0),
            base_url: env("PARLEY_TTS_BASE_URL").or(fc.tts.base_url),
            api_key: secret("PARLEY_TTS_API_KEY", fc.tts.api_key),
        };

        Ok(Self {
            server,
            stt,
            llm,
            tts,
            api_keys,
        })
    }

    /// Build the configured speech-to-text client
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn speech_recognizer(&self) -> Result<Arc<dyn SpeechRecognizer>> {
        let stt = &self.stt;
        let client = match stt.provider {
            SttBackend::Whisper => SpeechToText::new_whisper(
                require_key(stt.api_key.as_ref(), self.api_keys.openai.as_ref(), "OPENAI_API_KEY")?,
                stt.model.clone(),
            )?,
            SttBackend::Deepgram => SpeechToText::new_deepgram(
                require_key(stt.api_key.as_ref(), self.api_keys.deepgram.as_ref(), "DEEPGRAM_API_KEY")?,
                stt.model.clone(),
            )?,
        };

        let client = match &stt.base_url {
            Some(url) => client.with_base_url(url.as_str()),
            None => client,
        };
        Ok(Arc::new(client))
    }

    /// Build the configured chat-completion client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn chat_model(&self) -> Result<Arc<dyn ChatModel>> {
        let llm = &self.llm;
        let key = require_key(llm.api_key.as_ref(), self.api_keys.openai.as_ref(), "OPENAI_API_KEY")?;
        let client = ChatCompletion::new(key, llm.model.clone())?.with_max_tokens(llm.max_tokens);

        let client = match &llm.base_url {
            Some(url) => client.with_base_url(url.as_str()),
            None => client,
        };
        Ok(Arc::new(client))
    }

    /// Build the configured text-to-speech client
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn speech_synthesizer(&self) -> Result<Arc<dyn SpeechSynthesizer>> {
        let tts = &self.tts;
        let client = match tts.provider {
            TtsBackend::OpenAI => TextToSpeech::new_openai_with_model(
                require_key(tts.api_key.as_ref(), self.api_keys.openai.as_ref(), "OPENAI_API_KEY")?,
                tts.voice.clone(),
                tts.speed,
                tts.model.clone(),
            )?,
            TtsBackend::ElevenLabs => TextToSpeech::new_elevenlabs_with_model(
                require_key(
                    tts.api_key.as_ref(),
                    self.api_keys.elevenlabs.as_ref(),
                    "ELEVENLABS_API_KEY",
                )?,
                tts.voice.clone(),
                tts.model.clone(),
            )?,
        };

        let client = match &tts.base_url {
            Some(url) => client.with_base_url(url.as_str()),
            None => client,
        };
        Ok(Arc::new(client))
    }
}

/// Parse an optional numeric env var, rejecting malformed values
fn parse_env<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid value for {key}: {raw}")))
        })
        .transpose()
}

/// Pick the stage-specific key, else the provider-wide one
fn require_key(
    stage: Option<&SecretString>,
    provider: Option<&SecretString>,
    env_name: &str,
) -> Result<SecretString> {
    stage
        .or(provider)
        .cloned()
        .ok_or_else(|| Error::Config(format!("{env_name} (or a stage api_key) is required")))
}
