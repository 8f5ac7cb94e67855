//! Core value types for the voice session manager

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use auravoice_provider::RecognitionErrorCode;

/// Confidence value meaning "the engine did not score this transcript".
pub const UNKNOWN_CONFIDENCE: f32 = -1.0;

/// Which kind of recognition session is active. At most one mode is active
/// at any instant; starting a new session tears down the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecognitionMode {
    /// No recognition session
    #[default]
    None,
    /// One-shot capture, over after the first final result or end event
    Single,
    /// Wake-word listening that re-arms itself per the restart policy
    Continuous,
}

/// A transcript delivered to the result callback.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    pub text: String,
    /// [`UNKNOWN_CONFIDENCE`] when the engine gave no score
    pub confidence: f32,
    pub is_final: bool,
}

/// A session-level recognition failure delivered to the error callback.
/// Never raised as a Rust error toward application code.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct RecognitionError {
    pub code: RecognitionErrorCode,
    pub message: String,
}

/// One recognizer hypothesis considered for wake-word detection.
#[derive(Debug, Clone, PartialEq)]
pub struct WakeWordCandidate {
    pub transcript: String,
    /// [`UNKNOWN_CONFIDENCE`] when unscored
    pub confidence: f32,
}

/// Delivered to the wake-word callback instead of a normal result when a
/// final continuous-mode transcript contains an activation phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct WakeWordEvent {
    /// The phrase variant that matched
    pub phrase: String,
    /// Text after the phrase, ready for command handling
    pub command: String,
    /// The full canonical transcript
    pub transcript: String,
}

/// Observational snapshot for UI affordance and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub mode: RecognitionMode,
    /// The recognizer confirmed it is capturing
    pub listening: bool,
    /// A playback request is active
    pub speaking: bool,
    pub restart_attempts: u32,
    pub pending_restart_delay: Option<Duration>,
}

/// Single-slot callbacks; a setter replaces the previous registration.
pub type ResultCallback = Arc<dyn Fn(RecognitionResult) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(RecognitionError) + Send + Sync>;
pub type WakeWordCallback = Arc<dyn Fn(WakeWordEvent) + Send + Sync>;
pub type TtsStartCallback = Arc<dyn Fn() + Send + Sync>;
pub type TtsCompleteCallback = Arc<dyn Fn() + Send + Sync>;
pub type TtsErrorCallback = Arc<dyn Fn(String) + Send + Sync>;
