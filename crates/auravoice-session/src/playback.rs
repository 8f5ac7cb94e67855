//! Speech playback controller
//!
//! Serializes text-to-speech playback and invalidates late provider
//! callbacks with a monotonically increasing request id: only the id issued
//! by the newest `speak` (or bumped by `stop_speaking`) may mutate playback
//! state, so at most one playback "counts" even when engine callbacks
//! straggle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use auravoice_provider::{PlaybackOutcome, SpeakOptions, SpeechSynthesizer};

use crate::types::{TtsCompleteCallback, TtsErrorCallback, TtsStartCallback};

#[derive(Default)]
struct TtsCallbacks {
    on_start: Option<TtsStartCallback>,
    on_complete: Option<TtsCompleteCallback>,
    on_error: Option<TtsErrorCallback>,
}

/// Owns the synthesizer channel. Never returns an error to the caller;
/// failures surface through the error callback and a normal return.
pub struct PlaybackController {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    current_id: AtomicU64,
    active: Mutex<bool>,
    callbacks: Mutex<TtsCallbacks>,
}

impl PlaybackController {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Arc<Self> {
        Arc::new(Self {
            synthesizer,
            current_id: AtomicU64::new(0),
            active: Mutex::new(false),
            callbacks: Mutex::new(TtsCallbacks::default()),
        })
    }

    /// Single-slot registration; replaces any previous callbacks.
    pub fn set_callbacks(
        &self,
        on_start: impl Fn() + Send + Sync + 'static,
        on_complete: impl Fn() + Send + Sync + 'static,
        on_error: impl Fn(String) + Send + Sync + 'static,
    ) {
        *self.callbacks.lock() = TtsCallbacks {
            on_start: Some(Arc::new(on_start)),
            on_complete: Some(Arc::new(on_complete)),
            on_error: Some(Arc::new(on_error)),
        };
    }

    pub(crate) fn clear_callbacks(&self) {
        *self.callbacks.lock() = TtsCallbacks::default();
    }

    /// Play the text, resolving once this call's playback is fully concluded
    /// (done, stopped or errored). A newer `speak` supersedes this one: the
    /// stale completion still resolves the original call but fires no
    /// callbacks.
    pub async fn speak(&self, text: &str, options: &SpeakOptions) {
        let id = self.current_id.fetch_add(1, Ordering::SeqCst) + 1;
        *self.active.lock() = true;

        let on_start = self.callbacks.lock().on_start.clone();
        if let Some(on_start) = on_start {
            on_start();
        }

        // Playback never overlaps: cancel whatever is in flight first.
        if let Err(e) = self.synthesizer.stop().await {
            debug!(target: "tts", error = %e, "pre-speak cancel failed");
        }

        debug!(target: "tts", request_id = id, chars = text.len(), "playback starting");
        let outcome = self.synthesizer.speak(text, options).await;

        if let PlaybackOutcome::Error(message) = &outcome {
            warn!(target: "tts", request_id = id, %message, "playback error");
            let on_error = self.callbacks.lock().on_error.clone();
            if let Some(on_error) = on_error {
                on_error(message.clone());
            }
        }

        self.finalize(id, outcome);
    }

    /// Cancel playback. Fires the completion callback exactly once if a
    /// playback was active, then tells the engine to stop; the engine's own
    /// late callback is already invalidated by the id bump.
    pub async fn stop_speaking(&self) {
        self.current_id.fetch_add(1, Ordering::SeqCst);
        let was_active = std::mem::replace(&mut *self.active.lock(), false);
        if was_active {
            debug!(target: "tts", "playback cancelled by caller");
            let on_complete = self.callbacks.lock().on_complete.clone();
            if let Some(on_complete) = on_complete {
                on_complete();
            }
        }
        if let Err(e) = self.synthesizer.stop().await {
            debug!(target: "tts", error = %e, "engine stop failed");
        }
    }

    /// Best-effort engine query; false when the query fails.
    pub async fn is_speaking(&self) -> bool {
        self.synthesizer.is_speaking().await.unwrap_or(false)
    }

    /// Whether a playback request currently owns the speaking state.
    pub fn is_active(&self) -> bool {
        *self.active.lock()
    }

    /// Funnel for every playback conclusion. A stale id (superseded by a
    /// newer `speak` or a `stop_speaking`) is a no-op.
    fn finalize(&self, id: u64, outcome: PlaybackOutcome) {
        if self.current_id.load(Ordering::SeqCst) != id {
            debug!(target: "tts", request_id = id, "stale playback completion ignored");
            return;
        }
        *self.active.lock() = false;
        debug!(target: "tts", request_id = id, ?outcome, "playback concluded");
        let on_complete = self.callbacks.lock().on_complete.clone();
        if let Some(on_complete) = on_complete {
            on_complete();
        }
    }
}
