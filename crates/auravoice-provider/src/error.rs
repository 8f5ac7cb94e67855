//! Error types at the capability-provider boundary

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by provider command calls (start/stop/abort and the
/// synthesizer queries). Mid-session recognizer failures travel through the
/// event stream instead, as [`RecognitionErrorCode`] values.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The speech capability is missing on this platform
    #[error("speech capability not available: {0}")]
    NotAvailable(String),

    /// The recognizer rejected a session start for the given language
    #[error("recognizer start failed for {language}: {message}")]
    StartFailed { language: String, message: String },

    /// Any other backend failure
    #[error("provider backend error: {0}")]
    Backend(String),
}

/// Error codes a recognizer reports mid-session.
///
/// The set mirrors the web/native speech error vocabulary; only
/// `no-speech`, `network` and `speech-timeout` count as recoverable for the
/// continuous-mode restart policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorCode {
    NoSpeech,
    Network,
    SpeechTimeout,
    AudioCapture,
    NotAllowed,
    Aborted,
    Unknown,
}

impl RecognitionErrorCode {
    /// Whether the continuous-mode restart policy may react to this code.
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::NoSpeech | Self::Network | Self::SpeechTimeout)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSpeech => "no-speech",
            Self::Network => "network",
            Self::SpeechTimeout => "speech-timeout",
            Self::AudioCapture => "audio-capture",
            Self::NotAllowed => "not-allowed",
            Self::Aborted => "aborted",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RecognitionErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
