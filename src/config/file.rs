//! TOML configuration file loading
//!
//! Supports `~/.config/parley/config.toml` as a persistent config source.
//! All fields are optional. The file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// Speech-to-text configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Chat-completion configuration
    #[serde(default)]
    pub llm: LlmFileConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerFileConfig {
    /// Bind address
    pub host: Option<String>,

    /// API server port
    pub port: Option<u16>,

    /// Global requests-per-minute limit
    pub rate_limit_rpm: Option<u32>,

    /// Maximum request body size in bytes
    pub max_upload_bytes: Option<usize>,
}

/// Speech-to-text configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SttFileConfig {
    /// Provider ("whisper" or "deepgram")
    pub provider: Option<String>,

    /// Model (e.g. "whisper-1", "whisper-large-v3", "nova-2")
    pub model: Option<String>,

    /// Provider base URL override
    pub base_url: Option<String>,

    /// API key override for this stage
    pub api_key: Option<String>,
}

/// Chat-completion configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LlmFileConfig {
    /// Model identifier (e.g. "gpt-4o-mini", "llama3-8b-8192")
    pub model: Option<String>,

    /// OpenAI-compatible base URL override
    pub base_url: Option<String>,

    /// API key override for this stage
    pub api_key: Option<String>,

    /// Reply length cap
    pub max_tokens: Option<u32>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsFileConfig {
    /// Provider ("openai" or "elevenlabs")
    pub provider: Option<String>,

    /// Model (e.g. "tts-1", "eleven_turbo_v2")
    pub model: Option<String>,

    /// Voice identifier (e.g. "alloy", or an ElevenLabs voice ID)
    pub voice: Option<String>,

    /// Speed multiplier (OpenAI only)
    pub speed: Option<f64>,

    /// Provider base URL override
    pub base_url: Option<String>,

    /// API key override for this stage
    pub api_key: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file from the standard path
///
/// Returns `ParleyConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> ParleyConfigFile {
    let Some(path) = config_file_path() else {
        return ParleyConfigFile::default();
    };

    if !path.exists() {
        return ParleyConfigFile::default();
    }

    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            ParleyConfigFile::default()
        }
    }
}

/// Load a TOML config file from an explicit path
///
/// # Errors
///
/// Returns error if the file can't be read or parsed
pub fn load_from(path: &Path) -> Result<ParleyConfigFile> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Return the config file path: `~/.config/parley/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("parley").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8080

[tts]
provider = "elevenlabs"
voice = "abc123"
"#
        )
        .unwrap();

        let config = load_from(file.path()).unwrap();
        assert_eq!(config.server.port, Some(8080));
        assert_eq!(config.server.host, None);
        assert_eq!(config.tts.provider.as_deref(), Some("elevenlabs"));
        assert_eq!(config.tts.voice.as_deref(), Some("abc123"));
        assert!(config.stt.model.is_none());
    }

    #[test]
    fn empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = load_from(file.path()).unwrap();
        assert!(config.llm.model.is_none());
        assert!(config.api_keys.openai.is_none());
    }

    #[test]
    fn unknown_section_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[memory]\nenabled = true").unwrap();
        assert!(matches!(load_from(file.path()), Err(crate::Error::Toml(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_from(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }
}
