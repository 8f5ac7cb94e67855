//! Voice-interaction session management for the Aura companion app
//!
//! This crate owns the lifecycle of speech recognition and synthesis for
//! the hands-free "Orito" assistant: starting and stopping recognition
//! sessions, spotting the wake phrase inside continuous audio, recovering
//! from transient recognizer failures with exponential backoff, and
//! serializing text-to-speech playback so late engine callbacks can never
//! resurrect a superseded utterance.
//!
//! The native speech engines sit behind the traits in
//! [`auravoice_provider`]; the rest of the application talks only to
//! [`VoiceSessionManager`].

pub mod config;
pub mod lifecycle;
pub mod manager;
pub mod playback;
pub mod recognition;
pub mod settings;
pub mod types;
pub mod wake;

pub use config::VoiceSessionConfig;
pub use lifecycle::{AppLifecycleState, LifecycleBridge};
pub use manager::VoiceSessionManager;
pub use playback::PlaybackController;
pub use recognition::RecognitionController;
pub use settings::{MemorySettings, SettingsStore, CONTINUOUS_LISTENING_KEY};
pub use types::{
    RecognitionError, RecognitionMode, RecognitionResult, SessionStatus, WakeWordCandidate,
    WakeWordEvent, UNKNOWN_CONFIDENCE,
};
pub use wake::{WakeDetection, WakePhraseMatcher};
