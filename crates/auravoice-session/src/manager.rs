//! Public facade for the voice subsystem
//!
//! `VoiceSessionManager` is the only type the rest of the application
//! consumes. It composes the recognition controller, playback controller,
//! wake matcher and lifecycle bridge.

use std::sync::Arc;

use tokio::sync::{watch, Mutex as AsyncMutex};
use tracing::info;

use auravoice_provider::{SpeakOptions, SpeechRecognizer, SpeechSynthesizer};

use crate::config::VoiceSessionConfig;
use crate::lifecycle::{AppLifecycleState, LifecycleBridge};
use crate::playback::PlaybackController;
use crate::recognition::RecognitionController;
use crate::settings::{SettingsStore, CONTINUOUS_LISTENING_KEY};
use crate::types::{
    RecognitionError, RecognitionResult, SessionStatus, WakeWordEvent,
};
use crate::wake::WakeDetection;

#[derive(Default)]
struct RuntimeState {
    initialized: bool,
    available: bool,
    lifecycle: Option<LifecycleBridge>,
}

/// The voice-interaction session manager.
///
/// Constructed once by the hosting application and shared by handle; tests
/// build a fresh instance per case instead of relying on `cleanup`.
pub struct VoiceSessionManager {
    recognizer: Arc<dyn SpeechRecognizer>,
    settings: Arc<dyn SettingsStore>,
    recognition: Arc<RecognitionController>,
    playback: Arc<PlaybackController>,
    lifecycle_rx: watch::Receiver<AppLifecycleState>,
    speak_defaults: SpeakOptions,
    runtime: AsyncMutex<RuntimeState>,
}

impl VoiceSessionManager {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        settings: Arc<dyn SettingsStore>,
        lifecycle_rx: watch::Receiver<AppLifecycleState>,
        config: VoiceSessionConfig,
    ) -> Self {
        let speak_defaults = config.speak_defaults.clone();
        let recognition =
            RecognitionController::new(Arc::clone(&recognizer), Arc::clone(&settings), config);
        Self {
            recognizer,
            settings,
            recognition,
            playback: PlaybackController::new(synthesizer),
            lifecycle_rx,
            speak_defaults,
            runtime: AsyncMutex::new(RuntimeState::default()),
        }
    }

    /// Idempotent setup: checks recognizer availability and arms the
    /// lifecycle bridge. Concurrent callers serialize on one
    /// initialization; repeat calls return the cached availability. Event
    /// forwarding is per session and owned by the recognition controller.
    pub async fn initialize(&self) -> bool {
        let mut runtime = self.runtime.lock().await;
        if runtime.initialized {
            return runtime.available;
        }

        let available = self.recognizer.is_available();
        if available {
            runtime.lifecycle = Some(LifecycleBridge::spawn(
                self.lifecycle_rx.clone(),
                Arc::clone(&self.recognition),
            ));
        }

        runtime.initialized = true;
        runtime.available = available;
        info!(target: "recognition", available, "voice session manager initialized");
        available
    }

    pub fn is_available(&self) -> bool {
        self.recognizer.is_available()
    }

    /// One-shot recognition.
    pub async fn start_recognition(&self) -> bool {
        self.recognition.start_single().await
    }

    pub async fn stop_recognition(&self) {
        self.recognition.stop().await;
    }

    /// Wake-word listening; persists the preference on.
    pub async fn start_continuous_listening(&self) -> bool {
        self.recognition.start_continuous().await
    }

    /// Stops listening and persists the preference off, so the lifecycle
    /// bridge will not re-arm what the user turned off.
    pub async fn stop_continuous_listening(&self) {
        self.settings.set_bool(CONTINUOUS_LISTENING_KEY, false);
        self.recognition.stop().await;
    }

    /// Stops whichever mode is active without touching the preference.
    pub async fn stop_listening(&self) {
        self.recognition.stop().await;
    }

    pub fn is_currently_listening(&self) -> bool {
        self.recognition.is_listening()
    }

    pub async fn set_continuous_listening_enabled(&self, enabled: bool) -> bool {
        if enabled {
            self.start_continuous_listening().await
        } else {
            self.stop_continuous_listening().await;
            true
        }
    }

    pub fn is_continuous_listening_enabled(&self) -> bool {
        self.settings
            .get_bool(CONTINUOUS_LISTENING_KEY)
            .unwrap_or(false)
    }

    /// Play text, resolving when playback fully concludes. Defaults from
    /// the configuration apply when `options` is `None`.
    pub async fn speak(&self, text: &str, options: Option<SpeakOptions>) {
        let options = options.unwrap_or_else(|| self.speak_defaults.clone());
        self.playback.speak(text, &options).await;
    }

    pub async fn stop_speaking(&self) {
        self.playback.stop_speaking().await;
    }

    pub async fn is_speaking(&self) -> bool {
        self.playback.is_speaking().await
    }

    pub fn set_recognition_result_callback(
        &self,
        callback: impl Fn(RecognitionResult) + Send + Sync + 'static,
    ) {
        self.recognition.set_result_callback(callback);
    }

    pub fn set_recognition_error_callback(
        &self,
        callback: impl Fn(RecognitionError) + Send + Sync + 'static,
    ) {
        self.recognition.set_error_callback(callback);
    }

    pub fn set_wake_word_callback(
        &self,
        callback: impl Fn(WakeWordEvent) + Send + Sync + 'static,
    ) {
        self.recognition.set_wake_word_callback(callback);
    }

    pub fn set_tts_callbacks(
        &self,
        on_start: impl Fn() + Send + Sync + 'static,
        on_complete: impl Fn() + Send + Sync + 'static,
        on_error: impl Fn(String) + Send + Sync + 'static,
    ) {
        self.playback.set_callbacks(on_start, on_complete, on_error);
    }

    /// Wake-word check for transcripts that arrive from elsewhere.
    pub fn detect_wake_word_in_text(&self, text: &str) -> WakeDetection {
        self.recognition.matcher().detect(text)
    }

    pub fn extract_command_after_wake_word(&self, text: &str) -> String {
        self.recognition.matcher().extract_command(text)
    }

    /// Observational snapshot for status indicators.
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            mode: self.recognition.mode(),
            listening: self.recognition.engine_listening(),
            speaking: self.playback.is_active(),
            restart_attempts: self.recognition.restart_attempts(),
            pending_restart_delay: self.recognition.pending_restart_delay(),
        }
    }

    /// Full teardown: stops any session and playback, drops the lifecycle
    /// subscription, clears callbacks, and resets the initialized flag so a
    /// later `initialize` re-runs setup.
    pub async fn cleanup(&self) {
        let mut runtime = self.runtime.lock().await;
        self.recognition.stop().await;
        self.playback.stop_speaking().await;
        self.recognition.clear_callbacks();
        self.playback.clear_callbacks();
        if let Some(bridge) = runtime.lifecycle.take() {
            bridge.shutdown();
        }
        runtime.initialized = false;
        runtime.available = false;
        info!(target: "recognition", "voice session manager cleaned up");
    }
}
