//! Speech recognizer contract: commands in, events out

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::{ProviderError, RecognitionErrorCode};

/// One hypothesis inside a recognizer result event.
///
/// `confidence` is `None` when the engine does not score its alternatives.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptAlternative {
    pub transcript: String,
    pub confidence: Option<f32>,
}

impl TranscriptAlternative {
    pub fn new(transcript: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

/// Events emitted by a recognition session.
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// The engine has actually opened the microphone
    Started,
    /// One or more hypotheses for the current utterance
    Result {
        alternatives: Vec<TranscriptAlternative>,
        is_final: bool,
    },
    /// The session terminated naturally
    Ended,
    /// The session failed; the session is no longer capturing
    Error {
        code: RecognitionErrorCode,
        message: String,
    },
}

/// Options for one recognition session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionOptions {
    /// BCP-47 language tag for this session
    pub language: String,
    /// Emit interim (non-final) results while the user is still talking
    pub interim_results: bool,
    /// Keep capturing across utterances instead of stopping at the first one
    pub continuous: bool,
    /// Maximum hypotheses per result event
    pub max_alternatives: u32,
    /// Grammar hint phrases passed to the engine
    pub contextual_hints: Vec<String>,
    /// Ask the engine to punctuate transcripts
    pub add_punctuation: bool,
    /// Refuse cloud-backed recognition
    pub on_device_only: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            interim_results: true,
            continuous: false,
            max_alternatives: 3,
            contextual_hints: Vec::new(),
            add_punctuation: true,
            on_device_only: false,
        }
    }
}

/// Microphone/recognition permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionStatus {
    pub granted: bool,
}

impl PermissionStatus {
    pub const GRANTED: Self = Self { granted: true };
    pub const DENIED: Self = Self { granted: false };
}

/// A native speech-recognition engine.
///
/// Implementations own a single microphone channel; callers must serialize
/// start/stop transitions. Events are delivered on a broadcast stream so the
/// session manager can attach one forwarder per initialization.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Whether recognition is supported on this device at all.
    fn is_available(&self) -> bool;

    /// Current permission state without prompting the user.
    async fn permissions(&self) -> PermissionStatus;

    /// Prompt the user for permission if it was not already granted.
    async fn request_permissions(&self) -> PermissionStatus;

    /// Open a recognition session. At most one session exists at a time;
    /// starting while a session is active is a provider error.
    async fn start(&self, options: RecognitionOptions) -> Result<(), ProviderError>;

    /// Gracefully end the session, letting pending results flush. Resolves
    /// only after the session's events were delivered: anything observed on
    /// a subscription taken after `stop` returns belongs to a newer
    /// session.
    async fn stop(&self) -> Result<(), ProviderError>;

    /// Tear the session down immediately, discarding pending results.
    async fn abort(&self) -> Result<(), ProviderError>;

    /// Subscribe to the recognizer's event stream.
    fn subscribe(&self) -> broadcast::Receiver<RecognizerEvent>;
}
