//! Capability-provider boundary for AuraVoice
//!
//! This crate defines the traits and event types through which the session
//! manager drives a native speech stack: a recognizer that streams
//! start/result/end/error events, and a synthesizer whose playback concludes
//! with a done/stopped/error outcome. Real bindings (iOS/Android engines)
//! implement these traits in the hosting application; this crate ships only
//! the contract plus scriptable mocks for tests.

pub mod error;
pub mod mock;
pub mod recognizer;
pub mod synthesizer;

pub use error::{ProviderError, RecognitionErrorCode};
pub use mock::{MockRecognizer, MockSynthesizer};
pub use recognizer::{
    PermissionStatus, RecognitionOptions, RecognizerEvent, SpeechRecognizer,
    TranscriptAlternative,
};
pub use synthesizer::{PlaybackOutcome, SpeakOptions, SpeechSynthesizer};
