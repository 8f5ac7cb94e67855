//! Recognition session controller
//!
//! Owns the mode state machine (none / single-shot / continuous), interprets
//! recognizer events, routes wake-word hits, and applies the restart/backoff
//! policy that keeps continuous listening alive through transient engine
//! failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use auravoice_provider::{
    RecognitionErrorCode, RecognizerEvent, SpeechRecognizer, TranscriptAlternative,
};

use crate::config::VoiceSessionConfig;
use crate::settings::{SettingsStore, CONTINUOUS_LISTENING_KEY};
use crate::types::{
    ErrorCallback, RecognitionError, RecognitionMode, RecognitionResult, ResultCallback,
    WakeWordCallback, WakeWordCandidate, WakeWordEvent, UNKNOWN_CONFIDENCE,
};
use crate::wake::WakePhraseMatcher;

/// A scheduled continuous-mode restart. Cancellation aborts the timer task;
/// the task itself takes the handle out of the state before it starts a
/// session, so firing never cancels itself.
struct ScheduledRestart {
    delay: Duration,
    task: JoinHandle<()>,
}

impl ScheduledRestart {
    fn cancel(self) {
        self.task.abort();
    }
}

#[derive(Default)]
struct ControllerState {
    mode: RecognitionMode,
    /// The engine confirmed it is capturing (informational)
    listening: bool,
    /// Whether the current session delivered any result event
    got_result: bool,
    /// True only while continuous mode is active and not explicitly stopped
    auto_restart: bool,
    restart_attempts: u32,
    pending_restart: Option<ScheduledRestart>,
    /// Bumped on every session transition; events stamped with an older
    /// value belong to a torn-down session and are dropped
    generation: u64,
    /// Forwarder task of the current session, reading its subscription
    forwarder: Option<JoinHandle<()>>,
}

impl ControllerState {
    fn cancel_pending_restart(&mut self) {
        if let Some(restart) = self.pending_restart.take() {
            restart.cancel();
        }
    }

    /// Invalidate the current session: any event it still flushes carries a
    /// stale generation and its forwarder stops reading.
    fn retire_session(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(task) = self.forwarder.take() {
            task.abort();
        }
    }
}

/// Drives recognition sessions against the capability provider.
///
/// All methods take `&self`; the facade and the lifecycle/restart tasks
/// share one instance behind an `Arc`.
pub struct RecognitionController {
    recognizer: Arc<dyn SpeechRecognizer>,
    settings: Arc<dyn SettingsStore>,
    matcher: WakePhraseMatcher,
    config: VoiceSessionConfig,
    state: Mutex<ControllerState>,
    foreground: AtomicBool,
    on_result: Mutex<Option<ResultCallback>>,
    on_error: Mutex<Option<ErrorCallback>>,
    on_wake_word: Mutex<Option<WakeWordCallback>>,
}

impl RecognitionController {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        settings: Arc<dyn SettingsStore>,
        config: VoiceSessionConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            recognizer,
            settings,
            matcher: WakePhraseMatcher::new(&config.wake_phrases),
            config,
            state: Mutex::new(ControllerState::default()),
            foreground: AtomicBool::new(true),
            on_result: Mutex::new(None),
            on_error: Mutex::new(None),
            on_wake_word: Mutex::new(None),
        })
    }

    pub fn set_result_callback(
        &self,
        callback: impl Fn(RecognitionResult) + Send + Sync + 'static,
    ) {
        *self.on_result.lock() = Some(Arc::new(callback));
    }

    pub fn set_error_callback(
        &self,
        callback: impl Fn(RecognitionError) + Send + Sync + 'static,
    ) {
        *self.on_error.lock() = Some(Arc::new(callback));
    }

    pub fn set_wake_word_callback(
        &self,
        callback: impl Fn(WakeWordEvent) + Send + Sync + 'static,
    ) {
        *self.on_wake_word.lock() = Some(Arc::new(callback));
    }

    pub(crate) fn clear_callbacks(&self) {
        *self.on_result.lock() = None;
        *self.on_error.lock() = None;
        *self.on_wake_word.lock() = None;
    }

    pub fn matcher(&self) -> &WakePhraseMatcher {
        &self.matcher
    }

    pub fn mode(&self) -> RecognitionMode {
        self.state.lock().mode
    }

    /// Whether a recognition session (either mode) is active.
    pub fn is_listening(&self) -> bool {
        self.state.lock().mode != RecognitionMode::None
    }

    /// Whether the engine confirmed it is capturing audio.
    pub fn engine_listening(&self) -> bool {
        self.state.lock().listening
    }

    pub fn restart_attempts(&self) -> u32 {
        self.state.lock().restart_attempts
    }

    pub fn pending_restart_delay(&self) -> Option<Duration> {
        self.state.lock().pending_restart.as_ref().map(|r| r.delay)
    }

    pub(crate) fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::SeqCst);
    }

    /// One-shot capture. Returns false without side effects when the
    /// capability is missing or permission stays denied.
    pub async fn start_single(self: &Arc<Self>) -> bool {
        if !self.ensure_permitted().await {
            return false;
        }
        self.begin_session(RecognitionMode::Single).await
    }

    /// Explicit continuous start: persists the preference, resets the
    /// restart chain, then opens a continuous session.
    pub async fn start_continuous(self: &Arc<Self>) -> bool {
        if !self.ensure_permitted().await {
            return false;
        }
        self.settings.set_bool(CONTINUOUS_LISTENING_KEY, true);
        self.state.lock().restart_attempts = 0;
        self.begin_session(RecognitionMode::Continuous).await
    }

    /// Continuous start on behalf of the restart policy or the lifecycle
    /// bridge: the attempt counter and the persisted preference stay
    /// untouched.
    pub(crate) async fn start_continuous_internal(self: &Arc<Self>) -> bool {
        if !self.ensure_permitted().await {
            return false;
        }
        self.begin_session(RecognitionMode::Continuous).await
    }

    /// Stop whichever session is active: disarm auto-restart, cancel any
    /// pending restart, clear the mode, then stop the engine (graceful
    /// first, abort as fallback).
    pub async fn stop(&self) {
        {
            let mut state = self.state.lock();
            state.cancel_pending_restart();
            state.retire_session();
            state.auto_restart = false;
            state.mode = RecognitionMode::None;
            state.listening = false;
        }
        self.provider_stop().await;
        info!(target: "recognition", "recognition stopped");
    }

    /// Lifecycle-driven teardown; identical to `stop` but the persisted
    /// preference is left alone so foregrounding can re-arm.
    pub(crate) async fn suspend(&self) {
        info!(target: "lifecycle", "suspending recognition");
        self.stop().await;
    }

    /// Re-arm continuous listening after a foreground transition, but only
    /// when the persisted preference asks for it and no session is active.
    pub(crate) async fn resume_if_enabled(self: &Arc<Self>) {
        let enabled = self
            .settings
            .get_bool(CONTINUOUS_LISTENING_KEY)
            .unwrap_or(false);
        if enabled && self.mode() == RecognitionMode::None {
            info!(target: "lifecycle", "re-arming continuous listening after foreground");
            if !self.start_continuous_internal().await {
                warn!(target: "lifecycle", "failed to re-arm continuous listening");
            }
        }
    }

    /// Feed one recognizer event into the state machine on behalf of the
    /// current session. Live sessions deliver through their forwarder,
    /// which stamps the session generation; tests call this directly.
    pub fn handle_event(self: &Arc<Self>, event: RecognizerEvent) {
        let generation = self.state.lock().generation;
        self.handle_session_event(generation, event);
    }

    fn handle_session_event(self: &Arc<Self>, generation: u64, event: RecognizerEvent) {
        if self.state.lock().generation != generation {
            debug!(target: "recognition", "dropping event from a torn-down session");
            return;
        }
        match event {
            RecognizerEvent::Started => {
                self.state.lock().listening = true;
                debug!(target: "recognition", "engine confirmed capture start");
            }
            RecognizerEvent::Result {
                alternatives,
                is_final,
            } => self.handle_result(alternatives, is_final),
            RecognizerEvent::Ended => self.handle_ended(),
            RecognizerEvent::Error { code, message } => self.handle_error(code, message),
        }
    }

    async fn ensure_permitted(&self) -> bool {
        if !self.recognizer.is_available() {
            debug!(target: "recognition", "recognition unavailable on this device");
            return false;
        }
        if self.recognizer.permissions().await.granted {
            return true;
        }
        let granted = self.recognizer.request_permissions().await.granted;
        if !granted {
            info!(target: "recognition", "recognition permission denied");
        }
        granted
    }

    /// Tear down any prior session, set the new mode, then start the engine
    /// walking the language preference list. On total failure the mode
    /// reverts to `None`.
    ///
    /// The prior session is retired before its engine stop, so whatever it
    /// flushes while stopping lands on a dead subscription or a stale
    /// generation, never on the session replacing it.
    async fn begin_session(self: &Arc<Self>, mode: RecognitionMode) -> bool {
        let prior = {
            let mut state = self.state.lock();
            state.cancel_pending_restart();
            state.retire_session();
            let prior = state.mode;
            state.mode = mode;
            state.listening = false;
            state.got_result = false;
            state.auto_restart = mode == RecognitionMode::Continuous;
            prior
        };
        if prior != RecognitionMode::None {
            self.provider_stop().await;
        }

        let continuous = mode == RecognitionMode::Continuous;
        for language in &self.config.languages {
            let options = self.config.recognition_options(language, continuous);
            // Subscribe before the engine opens so this session's first
            // events cannot be missed; the prior session's flush is already
            // over once its stop resolved.
            let events = self.recognizer.subscribe();
            match self.recognizer.start(options).await {
                Ok(()) => {
                    info!(
                        target: "recognition",
                        ?mode,
                        %language,
                        "recognition session started"
                    );
                    self.attach_forwarder(events);
                    return true;
                }
                Err(e) => {
                    warn!(
                        target: "recognition",
                        %language,
                        error = %e,
                        "engine start failed, trying next language"
                    );
                }
            }
        }

        let mut state = self.state.lock();
        state.mode = RecognitionMode::None;
        state.auto_restart = false;
        warn!(target: "recognition", "engine start failed for every preferred language");
        false
    }

    /// Spawn the forwarder reading this session's subscription into the
    /// state machine, stamped with the session's generation.
    fn attach_forwarder(self: &Arc<Self>, mut events: broadcast::Receiver<RecognizerEvent>) {
        let mut state = self.state.lock();
        let generation = state.generation;
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => controller.handle_session_event(generation, event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(target: "recognition", missed, "recognizer event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        if let Some(old) = state.forwarder.replace(task) {
            old.abort();
        }
    }

    async fn provider_stop(&self) {
        if let Err(e) = self.recognizer.stop().await {
            debug!(target: "recognition", error = %e, "graceful stop failed, aborting");
            if let Err(e) = self.recognizer.abort().await {
                warn!(target: "recognition", error = %e, "engine abort failed");
            }
        }
    }

    fn handle_result(self: &Arc<Self>, alternatives: Vec<TranscriptAlternative>, is_final: bool) {
        let mode = self.state.lock().mode;

        let mut scored: Vec<(WakeWordCandidate, crate::wake::WakeDetection)> = Vec::new();
        for alternative in &alternatives {
            let transcript = alternative.transcript.trim();
            if transcript.is_empty() {
                continue;
            }
            let detection = self.matcher.detect(transcript);
            scored.push((
                WakeWordCandidate {
                    transcript: transcript.to_string(),
                    confidence: alternative.confidence.unwrap_or(UNKNOWN_CONFIDENCE),
                },
                detection,
            ));
        }
        if scored.is_empty() {
            return;
        }
        self.state.lock().got_result = true;

        // A detected wake phrase wins even when its transcription scored
        // low; otherwise the highest-confidence alternative is canonical,
        // first one on ties or when nothing is scored.
        let pick = scored
            .iter()
            .position(|(_, detection)| detection.detected)
            .unwrap_or_else(|| {
                let mut best = 0;
                for (index, (candidate, _)) in scored.iter().enumerate().skip(1) {
                    if candidate.confidence > scored[best].0.confidence {
                        best = index;
                    }
                }
                best
            });
        let (candidate, detection) = scored.swap_remove(pick);

        if mode == RecognitionMode::Continuous && is_final && detection.detected {
            let phrase = detection.phrase.unwrap_or_default();
            let command = self.matcher.extract_command(&candidate.transcript);
            info!(target: "wake", %phrase, %command, "wake phrase detected");
            let callback = self.on_wake_word.lock().clone();
            if let Some(callback) = callback {
                callback(WakeWordEvent {
                    phrase,
                    command,
                    transcript: candidate.transcript,
                });
            }
            // Consumed as a trigger; not forwarded as dictation.
            return;
        }

        debug!(
            target: "recognition",
            is_final,
            confidence = candidate.confidence,
            "recognition result"
        );
        let callback = self.on_result.lock().clone();
        if let Some(callback) = callback {
            callback(RecognitionResult {
                text: candidate.transcript,
                confidence: candidate.confidence,
                is_final,
            });
        }
    }

    fn handle_ended(self: &Arc<Self>) {
        let (was_single, got_result) = {
            let mut state = self.state.lock();
            state.listening = false;
            let was_single = state.mode == RecognitionMode::Single;
            if was_single {
                // The one-shot session is over regardless of outcome.
                state.mode = RecognitionMode::None;
            }
            (was_single, state.got_result)
        };

        if was_single && !got_result {
            // Without this a single-shot caller would wait forever.
            warn!(target: "recognition", "single-shot session ended without speech");
            self.emit_error(RecognitionError {
                code: RecognitionErrorCode::NoSpeech,
                message: "recognition ended without speech".to_string(),
            });
        }

        self.evaluate_restart();
    }

    fn handle_error(self: &Arc<Self>, code: RecognitionErrorCode, message: String) {
        self.state.lock().listening = false;
        warn!(target: "recognition", %code, %message, "engine error");
        self.emit_error(RecognitionError { code, message });
        if code.is_recoverable() {
            self.evaluate_restart();
        }
    }

    fn emit_error(&self, error: RecognitionError) {
        let callback = self.on_error.lock().clone();
        if let Some(callback) = callback {
            callback(error);
        }
    }

    /// Schedule a continuous-mode restart with exponential backoff, unless
    /// auto-restart was disarmed, the app is backgrounded, or the attempt
    /// ceiling was reached (dormancy is silent; an explicit start revives
    /// it).
    fn evaluate_restart(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if !state.auto_restart || state.mode != RecognitionMode::Continuous {
            return;
        }
        if !self.foreground.load(Ordering::SeqCst) {
            debug!(target: "recognition", "skipping restart while backgrounded");
            return;
        }
        if state.restart_attempts >= self.config.restart_max_attempts {
            info!(
                target: "recognition",
                attempts = state.restart_attempts,
                "restart ceiling reached, continuous listening dormant"
            );
            return;
        }

        let delay = self
            .config
            .restart_base_delay()
            .saturating_mul(2u32.saturating_pow(state.restart_attempts));
        state.restart_attempts += 1;
        state.cancel_pending_restart();

        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Take our own handle out first so the session start below
            // cannot cancel the very task running it.
            controller.state.lock().pending_restart.take();
            let still_armed = {
                let state = controller.state.lock();
                state.auto_restart && state.mode == RecognitionMode::Continuous
            };
            if !still_armed {
                return;
            }
            if !controller.start_continuous_internal().await {
                warn!(target: "recognition", "scheduled restart could not open a session");
            }
        });
        state.pending_restart = Some(ScheduledRestart { delay, task });
        debug!(
            target: "recognition",
            delay_ms = delay.as_millis() as u64,
            attempt = state.restart_attempts,
            "continuous restart scheduled"
        );
    }
}
