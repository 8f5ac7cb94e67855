//! Speech synthesizer contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Options for a single utterance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeakOptions {
    /// BCP-47 language tag; engine default when `None`
    pub language: Option<String>,
    /// Pitch multiplier, 1.0 is normal
    pub pitch: Option<f32>,
    /// Rate multiplier, 1.0 is normal
    pub rate: Option<f32>,
}

/// How a playback request concluded.
///
/// This is the promise-shaped form of the native engine's
/// done/stopped/error callbacks: `speak` resolves with exactly one of these
/// once the utterance is over, however it ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackOutcome {
    /// Playback ran to the end of the text
    Done,
    /// Playback was cut short by a stop/cancel
    Stopped,
    /// The engine failed mid-utterance
    Error(String),
}

/// A native text-to-speech engine.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Play the given text, resolving when playback fully concludes.
    /// Implementations never reject; failures arrive as
    /// [`PlaybackOutcome::Error`].
    async fn speak(&self, text: &str, options: &SpeakOptions) -> PlaybackOutcome;

    /// Cancel the in-flight utterance, if any.
    async fn stop(&self) -> Result<(), ProviderError>;

    /// Best-effort query for whether audio is currently playing.
    async fn is_speaking(&self) -> Result<bool, ProviderError>;
}
