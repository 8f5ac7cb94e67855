//! Session manager configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use auravoice_provider::{RecognitionOptions, SpeakOptions};

/// All tunables for the voice session manager.
///
/// The restart ceiling and base delay are configuration rather than
/// literals; the shipped defaults (4 attempts, 250 ms) match the values the
/// companion app has always used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSessionConfig {
    /// Accepted wake-phrase variants, checked in list order. Common
    /// recognizer misspellings of the assistant name are included so a noisy
    /// transcription still triggers.
    pub wake_phrases: Vec<String>,
    /// Preference-ordered recognition languages; a failed start falls
    /// through to the next entry.
    pub languages: Vec<String>,
    /// Domain vocabulary passed to the engine as grammar hints, on top of
    /// the wake phrases. A tunable hint, not a correctness requirement.
    pub contextual_hints: Vec<String>,
    /// Emit interim results during capture
    pub interim_results: bool,
    /// Hypotheses requested per result event
    pub max_alternatives: u32,
    /// Ask the engine to punctuate transcripts
    pub add_punctuation: bool,
    /// Refuse cloud-backed recognition
    pub on_device_only: bool,
    /// Automatic continuous-mode restarts stop for good once this many
    /// attempts were made without an explicit caller start.
    pub restart_max_attempts: u32,
    /// Backoff base; the delay doubles with every attempt.
    pub restart_base_delay_ms: u64,
    /// Defaults applied when `speak` is called without options
    pub speak_defaults: SpeakOptions,
}

impl Default for VoiceSessionConfig {
    fn default() -> Self {
        Self {
            wake_phrases: vec![
                "hey orito".to_string(),
                "hey arito".to_string(),
                "hey oreeto".to_string(),
                "hay orito".to_string(),
                "orito".to_string(),
            ],
            languages: vec!["en-US".to_string(), "en-GB".to_string()],
            contextual_hints: vec![
                "medication".to_string(),
                "reminder".to_string(),
                "journal".to_string(),
                "caregiver".to_string(),
                "help".to_string(),
            ],
            interim_results: true,
            max_alternatives: 3,
            add_punctuation: true,
            on_device_only: false,
            restart_max_attempts: 4,
            restart_base_delay_ms: 250,
            speak_defaults: SpeakOptions::default(),
        }
    }
}

impl VoiceSessionConfig {
    pub fn restart_base_delay(&self) -> Duration {
        Duration::from_millis(self.restart_base_delay_ms)
    }

    /// Provider options for one session in the given language.
    pub fn recognition_options(&self, language: &str, continuous: bool) -> RecognitionOptions {
        let mut contextual_hints = self.wake_phrases.clone();
        contextual_hints.extend(self.contextual_hints.iter().cloned());
        RecognitionOptions {
            language: language.to_string(),
            interim_results: self.interim_results,
            continuous,
            max_alternatives: self.max_alternatives,
            contextual_hints,
            add_punctuation: self.add_punctuation,
            on_device_only: self.on_device_only,
        }
    }
}
