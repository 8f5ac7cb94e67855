//! Shared fixtures for session integration tests
#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::watch;

use auravoice_provider::{
    MockRecognizer, MockSynthesizer, RecognitionErrorCode, RecognizerEvent, SpeechRecognizer,
    SpeechSynthesizer, TranscriptAlternative,
};
use auravoice_session::{
    AppLifecycleState, MemorySettings, RecognitionController, SettingsStore, VoiceSessionConfig,
    VoiceSessionManager,
};

/// Let spawned forwarder/restart tasks run on the current-thread runtime.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Fresh controller over the given mock recognizer.
pub fn controller(
    recognizer: &Arc<MockRecognizer>,
) -> (Arc<RecognitionController>, Arc<MemorySettings>) {
    let settings = Arc::new(MemorySettings::new());
    let controller = RecognitionController::new(
        Arc::clone(recognizer) as Arc<dyn SpeechRecognizer>,
        Arc::clone(&settings) as Arc<dyn SettingsStore>,
        VoiceSessionConfig::default(),
    );
    (controller, settings)
}

pub struct ManagerFixture {
    pub manager: VoiceSessionManager,
    pub recognizer: Arc<MockRecognizer>,
    pub synthesizer: Arc<MockSynthesizer>,
    pub settings: Arc<MemorySettings>,
    pub lifecycle_tx: watch::Sender<AppLifecycleState>,
}

/// Fresh manager wired to mocks, starting in the foreground.
pub fn manager() -> ManagerFixture {
    let recognizer = Arc::new(MockRecognizer::new());
    let synthesizer = Arc::new(MockSynthesizer::new());
    let settings = Arc::new(MemorySettings::new());
    let (lifecycle_tx, lifecycle_rx) = watch::channel(AppLifecycleState::Foreground);
    let manager = VoiceSessionManager::new(
        Arc::clone(&recognizer) as Arc<dyn SpeechRecognizer>,
        Arc::clone(&synthesizer) as Arc<dyn SpeechSynthesizer>,
        Arc::clone(&settings) as Arc<dyn SettingsStore>,
        lifecycle_rx,
        VoiceSessionConfig::default(),
    );
    ManagerFixture {
        manager,
        recognizer,
        synthesizer,
        settings,
        lifecycle_tx,
    }
}

/// A result event with a single scored alternative.
pub fn result_event(text: &str, confidence: Option<f32>, is_final: bool) -> RecognizerEvent {
    RecognizerEvent::Result {
        alternatives: vec![TranscriptAlternative::new(text, confidence)],
        is_final,
    }
}

/// A result event with several alternatives.
pub fn result_event_with(
    alternatives: Vec<(&str, Option<f32>)>,
    is_final: bool,
) -> RecognizerEvent {
    RecognizerEvent::Result {
        alternatives: alternatives
            .into_iter()
            .map(|(text, confidence)| TranscriptAlternative::new(text, confidence))
            .collect(),
        is_final,
    }
}

pub fn recoverable_error() -> RecognizerEvent {
    RecognizerEvent::Error {
        code: RecognitionErrorCode::Network,
        message: "network hiccup".to_string(),
    }
}

pub fn terminal_error() -> RecognizerEvent {
    RecognizerEvent::Error {
        code: RecognitionErrorCode::AudioCapture,
        message: "microphone lost".to_string(),
    }
}
