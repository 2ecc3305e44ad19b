//! Remote speech-to-text adapter.
//!
//! # Responsibility
//! - Load recorded audio into an uploadable payload.
//! - Send one transcription request and extract its `text` field.
//!
//! # Invariants
//! - Requests are bounded by `TranscriptionConfig::timeout_ms`.
//! - A single attempt is made; retry is the caller's decision.
//! - Audio bytes and transcripts are never logged.

use log::{error, info};
use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "whisper-1";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_AUDIO_MIME: &str = "audio/m4a";

/// Speech intake failure.
#[derive(Debug)]
pub enum TranscriptionError {
    /// The OS refused access to the recording (microphone/storage permission).
    PermissionDenied,
    /// The recording is missing or unreadable.
    AudioUnavailable(String),
    MissingApiKey,
    /// The service answered, but without any spoken text.
    NoSpeech,
    Timeout,
    Service(String),
}

impl Display for TranscriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied while reading the recording"),
            Self::AudioUnavailable(message) => write!(f, "recording unavailable: {message}"),
            Self::MissingApiKey => write!(f, "transcription API key is not configured"),
            Self::NoSpeech => write!(f, "no speech detected"),
            Self::Timeout => write!(f, "transcription request timed out"),
            Self::Service(message) => write!(f, "transcription failed: {message}"),
        }
    }
}

impl Error for TranscriptionError {}

/// Recorded audio ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl AudioPayload {
    /// Reads a recording from disk.
    ///
    /// The mime type is derived from the extension and defaults to `audio/m4a`,
    /// the format mobile recorders produce.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TranscriptionError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|err| match err.kind() {
            ErrorKind::PermissionDenied => TranscriptionError::PermissionDenied,
            _ => TranscriptionError::AudioUnavailable(format!("`{}`: {err}", path.display())),
        })?;
        if bytes.is_empty() {
            return Err(TranscriptionError::AudioUnavailable(format!(
                "`{}` is empty",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("speech.m4a")
            .to_string();
        let mime_type = mime_for_extension(path.extension().and_then(|ext| ext.to_str()));

        Ok(Self {
            file_name,
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

fn mime_for_extension(extension: Option<&str>) -> &'static str {
    match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("webm") => "audio/webm",
        Some("ogg") => "audio/ogg",
        _ => DEFAULT_AUDIO_MIME,
    }
}

/// Speech-to-text backend.
pub trait Transcriber {
    /// Returns the raw transcript; never an empty or whitespace-only string.
    fn transcribe(&self, audio: &AudioPayload) -> Result<String, TranscriptionError>;
}

/// Transcription service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl TranscriptionConfig {
    /// Defaults overlaid with `OPENAI_API_KEY`, `TODO_TRANSCRIBE_TIMEOUT_MS`
    /// and `TODO_TRANSCRIBE_CONNECT_TIMEOUT_MS`.
    ///
    /// Unparseable or zero timeouts keep their defaults so a request is
    /// always bounded.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            let trimmed = key.trim();
            if !trimmed.is_empty() {
                config.api_key = Some(trimmed.to_string());
            }
        }
        if let Some(timeout_ms) = env_millis("TODO_TRANSCRIBE_TIMEOUT_MS") {
            config.timeout_ms = timeout_ms;
        }
        if let Some(connect_timeout_ms) = env_millis("TODO_TRANSCRIBE_CONNECT_TIMEOUT_MS") {
            config.connect_timeout_ms = connect_timeout_ms;
        }
        config
    }
}

fn env_millis(name: &str) -> Option<u64> {
    std::env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
}

/// Whisper-compatible HTTP transcriber.
pub struct WhisperTranscriber {
    config: TranscriptionConfig,
    client: reqwest::blocking::Client,
}

impl WhisperTranscriber {
    /// Builds a transcriber with a client bounded by the configured timeouts.
    ///
    /// # Errors
    /// - `TranscriptionError::MissingApiKey` when no key is configured.
    /// - `TranscriptionError::Service` when the HTTP client cannot be built.
    pub fn new(config: TranscriptionConfig) -> Result<Self, TranscriptionError> {
        if config.api_key.is_none() {
            return Err(TranscriptionError::MissingApiKey);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .map_err(|err| TranscriptionError::Service(format!("http client: {err}")))?;

        Ok(Self { config, client })
    }

    fn url(&self) -> String {
        format!(
            "{}/audio/transcriptions",
            self.config.endpoint.trim_end_matches('/')
        )
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &AudioPayload) -> Result<String, TranscriptionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(TranscriptionError::MissingApiKey)?;
        let started_at = Instant::now();

        let file = Part::bytes(audio.bytes.clone())
            .file_name(audio.file_name.clone())
            .mime_str(&audio.mime_type)
            .map_err(|err| TranscriptionError::Service(format!("invalid mime type: {err}")))?;
        let form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone());

        let result = self
            .client
            .post(self.url())
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .map_err(map_request_error)
            .and_then(|response| {
                let status = response.status();
                let body = response.text().map_err(map_request_error)?;
                if !status.is_success() {
                    return Err(TranscriptionError::Service(format!(
                        "service returned status {status}"
                    )));
                }
                parse_transcription_body(&body)
            });

        match &result {
            Ok(_) => info!(
                "event=transcribe module=voice status=ok model={} audio_bytes={} duration_ms={}",
                self.config.model,
                audio.bytes.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=transcribe module=voice status=error model={} duration_ms={} error={err}",
                self.config.model,
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

fn map_request_error(err: reqwest::Error) -> TranscriptionError {
    if err.is_timeout() {
        TranscriptionError::Timeout
    } else {
        TranscriptionError::Service(err.to_string())
    }
}

#[derive(Deserialize)]
struct TranscriptionBody {
    #[serde(default)]
    text: Option<String>,
}

/// Extracts the transcript from a service response body.
///
/// # Errors
/// - `NoSpeech` when `text` is absent or whitespace-only.
/// - `Service` when the body is not the expected JSON object.
pub fn parse_transcription_body(body: &str) -> Result<String, TranscriptionError> {
    let parsed: TranscriptionBody = serde_json::from_str(body)
        .map_err(|err| TranscriptionError::Service(format!("malformed response: {err}")))?;
    match parsed.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(TranscriptionError::NoSpeech),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        mime_for_extension, parse_transcription_body, AudioPayload, TranscriptionConfig,
        TranscriptionError, WhisperTranscriber,
    };

    #[test]
    fn parse_body_returns_text() {
        let text = parse_transcription_body(r#"{"text":"buy milk and eggs"}"#).unwrap();
        assert_eq!(text, "buy milk and eggs");
    }

    #[test]
    fn parse_body_treats_blank_or_missing_text_as_no_speech() {
        assert!(matches!(
            parse_transcription_body(r#"{"text":"   "}"#),
            Err(TranscriptionError::NoSpeech)
        ));
        assert!(matches!(
            parse_transcription_body(r#"{"error":{"message":"bad key"}}"#),
            Err(TranscriptionError::NoSpeech)
        ));
    }

    #[test]
    fn parse_body_rejects_non_json() {
        assert!(matches!(
            parse_transcription_body("<html>"),
            Err(TranscriptionError::Service(_))
        ));
    }

    #[test]
    fn transcriber_requires_api_key() {
        let config = TranscriptionConfig::default();
        assert!(matches!(
            WhisperTranscriber::new(config),
            Err(TranscriptionError::MissingApiKey)
        ));
    }

    #[test]
    fn default_config_is_bounded() {
        let config = TranscriptionConfig::default();
        assert_eq!(config.model, "whisper-1");
        assert!(config.timeout_ms > 0);
        assert!(config.connect_timeout_ms > 0);
    }

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_for_extension(Some("WAV")), "audio/wav");
        assert_eq!(mime_for_extension(None), "audio/m4a");
    }

    #[test]
    fn missing_recording_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = AudioPayload::from_file(dir.path().join("speech.m4a")).unwrap_err();
        assert!(matches!(err, TranscriptionError::AudioUnavailable(_)));
    }

    #[test]
    fn recording_loads_with_name_and_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.m4a");
        std::fs::write(&path, [1_u8, 2, 3]).unwrap();

        let payload = AudioPayload::from_file(&path).unwrap();
        assert_eq!(payload.file_name, "speech.m4a");
        assert_eq!(payload.mime_type, "audio/m4a");
        assert_eq!(payload.bytes, vec![1, 2, 3]);
    }
}
