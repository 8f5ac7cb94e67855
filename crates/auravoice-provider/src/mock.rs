//! Scriptable provider mocks for tests
//!
//! These stand in for the native speech stack: every command call is
//! recorded, start/stop results and playback outcomes can be scripted, and
//! recognizer events are pushed from the test through `emit`.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};

use crate::error::ProviderError;
use crate::recognizer::{
    PermissionStatus, RecognitionOptions, RecognizerEvent, SpeechRecognizer,
};
use crate::synthesizer::{PlaybackOutcome, SpeakOptions, SpeechSynthesizer};

const EVENT_CAPACITY: usize = 64;

#[derive(Default)]
struct RecognizerState {
    start_results: VecDeque<Result<(), ProviderError>>,
    start_calls: Vec<RecognitionOptions>,
    stop_calls: usize,
    abort_calls: usize,
    stop_fails: bool,
    stop_flush: Vec<RecognizerEvent>,
}

/// Mock recognizer with scriptable availability, permissions and start
/// results.
pub struct MockRecognizer {
    events: broadcast::Sender<RecognizerEvent>,
    available: bool,
    permission_granted: bool,
    grant_on_request: bool,
    state: Mutex<RecognizerState>,
}

impl MockRecognizer {
    /// Available, permission already granted.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            events,
            available: true,
            permission_granted: true,
            grant_on_request: true,
            state: Mutex::new(RecognizerState::default()),
        }
    }

    /// Recognition unsupported on this device.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Permission not yet granted; `grant_on_request` decides whether the
    /// prompt succeeds.
    pub fn with_permission_prompt(grant_on_request: bool) -> Self {
        Self {
            permission_granted: false,
            grant_on_request,
            ..Self::new()
        }
    }

    /// Queue the result of the next `start` call. When the queue is empty,
    /// `start` succeeds.
    pub fn queue_start_result(&self, result: Result<(), ProviderError>) {
        self.state.lock().start_results.push_back(result);
    }

    /// Make graceful `stop` fail so callers fall back to `abort`.
    pub fn fail_stop(&self) {
        self.state.lock().stop_fails = true;
    }

    /// Queue an event the engine delivers while the next `stop` call is
    /// completing, like the final `Ended` a session flushes on teardown.
    pub fn flush_on_stop(&self, event: RecognizerEvent) {
        self.state.lock().stop_flush.push(event);
    }

    /// Push an event to all subscribers.
    pub fn emit(&self, event: RecognizerEvent) {
        let _ = self.events.send(event);
    }

    pub fn start_calls(&self) -> Vec<RecognitionOptions> {
        self.state.lock().start_calls.clone()
    }

    pub fn start_count(&self) -> usize {
        self.state.lock().start_calls.len()
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().stop_calls
    }

    pub fn abort_count(&self) -> usize {
        self.state.lock().abort_calls
    }
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechRecognizer for MockRecognizer {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn permissions(&self) -> PermissionStatus {
        PermissionStatus {
            granted: self.permission_granted,
        }
    }

    async fn request_permissions(&self) -> PermissionStatus {
        PermissionStatus {
            granted: self.permission_granted || self.grant_on_request,
        }
    }

    async fn start(&self, options: RecognitionOptions) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        state.start_calls.push(options);
        state.start_results.pop_front().unwrap_or(Ok(()))
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        let (flush, result) = {
            let mut state = self.state.lock();
            state.stop_calls += 1;
            let result = if state.stop_fails {
                Err(ProviderError::Backend("stop rejected".to_string()))
            } else {
                Ok(())
            };
            (std::mem::take(&mut state.stop_flush), result)
        };
        for event in flush {
            let _ = self.events.send(event);
        }
        result
    }

    async fn abort(&self) -> Result<(), ProviderError> {
        self.state.lock().abort_calls += 1;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<RecognizerEvent> {
        self.events.subscribe()
    }
}

struct SynthesizerState {
    scripted: VecDeque<PlaybackOutcome>,
    hold: bool,
    pending: VecDeque<oneshot::Sender<PlaybackOutcome>>,
    speak_calls: Vec<String>,
    stop_calls: usize,
    stop_releases: bool,
    is_speaking: Option<bool>,
}

/// Mock synthesizer whose playback outcomes are scripted or held open until
/// the test releases them.
pub struct MockSynthesizer {
    state: Mutex<SynthesizerState>,
}

impl MockSynthesizer {
    /// Every `speak` resolves immediately with `Done` unless scripted
    /// otherwise.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SynthesizerState {
                scripted: VecDeque::new(),
                hold: false,
                pending: VecDeque::new(),
                speak_calls: Vec::new(),
                stop_calls: 0,
                stop_releases: true,
                is_speaking: Some(false),
            }),
        }
    }

    /// `speak` blocks until the test calls `release` or `stop` cancels it.
    pub fn holding() -> Self {
        let this = Self::new();
        this.state.lock().hold = true;
        this
    }

    /// Queue the outcome of the next non-held `speak` call.
    pub fn script_outcome(&self, outcome: PlaybackOutcome) {
        self.state.lock().scripted.push_back(outcome);
    }

    /// Conclude the oldest held playback with the given outcome. Returns
    /// false when nothing was in flight.
    pub fn release(&self, outcome: PlaybackOutcome) -> bool {
        let sender = self.state.lock().pending.pop_front();
        match sender {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Whether `stop` concludes held playbacks with `Stopped` (the default,
    /// matching real engines' onStopped callback).
    pub fn set_stop_releases(&self, yes: bool) {
        self.state.lock().stop_releases = yes;
    }

    /// Script the `is_speaking` answer; `None` makes the query fail.
    pub fn set_is_speaking(&self, response: Option<bool>) {
        self.state.lock().is_speaking = response;
    }

    pub fn speak_calls(&self) -> Vec<String> {
        self.state.lock().speak_calls.clone()
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().stop_calls
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn speak(&self, text: &str, _options: &SpeakOptions) -> PlaybackOutcome {
        let wait = {
            let mut state = self.state.lock();
            state.speak_calls.push(text.to_string());
            if state.hold {
                let (tx, rx) = oneshot::channel();
                state.pending.push_back(tx);
                Some(rx)
            } else {
                None
            }
        };
        match wait {
            Some(rx) => rx.await.unwrap_or(PlaybackOutcome::Stopped),
            None => {
                let mut state = self.state.lock();
                state.scripted.pop_front().unwrap_or(PlaybackOutcome::Done)
            }
        }
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        let sender = {
            let mut state = self.state.lock();
            state.stop_calls += 1;
            if state.stop_releases {
                state.pending.pop_front()
            } else {
                None
            }
        };
        if let Some(tx) = sender {
            let _ = tx.send(PlaybackOutcome::Stopped);
        }
        Ok(())
    }

    async fn is_speaking(&self) -> Result<bool, ProviderError> {
        self.state
            .lock()
            .is_speaking
            .ok_or_else(|| ProviderError::Backend("is_speaking query failed".to_string()))
    }
}
