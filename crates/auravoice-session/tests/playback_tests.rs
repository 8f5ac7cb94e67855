//! Speech playback controller tests
//!
//! Exercises request-id invalidation: superseded playbacks never fire the
//! completion callback, and caller-side stops complete exactly once even
//! when the engine's own callback never arrives.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use auravoice_provider::{MockSynthesizer, PlaybackOutcome, SpeakOptions, SpeechSynthesizer};
use auravoice_session::PlaybackController;

use common::settle;

struct TtsCounters {
    starts: AtomicUsize,
    completes: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

fn wire_counters(controller: &PlaybackController) -> Arc<TtsCounters> {
    let counters = Arc::new(TtsCounters {
        starts: AtomicUsize::new(0),
        completes: AtomicUsize::new(0),
        errors: Mutex::new(Vec::new()),
    });
    let on_start = Arc::clone(&counters);
    let on_complete = Arc::clone(&counters);
    let on_error = Arc::clone(&counters);
    controller.set_callbacks(
        move || {
            on_start.starts.fetch_add(1, Ordering::SeqCst);
        },
        move || {
            on_complete.completes.fetch_add(1, Ordering::SeqCst);
        },
        move |message| {
            on_error.errors.lock().push(message);
        },
    );
    counters
}

#[tokio::test]
async fn speak_fires_start_then_complete() {
    let synth = Arc::new(MockSynthesizer::new());
    let controller = PlaybackController::new(Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>);
    let counters = wire_counters(&controller);

    controller.speak("hello there", &SpeakOptions::default()).await;

    assert_eq!(counters.starts.load(Ordering::SeqCst), 1);
    assert_eq!(counters.completes.load(Ordering::SeqCst), 1);
    assert!(counters.errors.lock().is_empty());
    assert!(!controller.is_active());
    assert_eq!(synth.speak_calls(), vec!["hello there".to_string()]);
}

#[tokio::test]
async fn speak_cancels_any_in_flight_utterance_first() {
    let synth = Arc::new(MockSynthesizer::new());
    let controller = PlaybackController::new(Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>);

    controller.speak("one", &SpeakOptions::default()).await;
    controller.speak("two", &SpeakOptions::default()).await;

    // One pre-speak cancel per call.
    assert_eq!(synth.stop_count(), 2);
}

#[tokio::test]
async fn superseded_playback_never_fires_complete() {
    let synth = Arc::new(MockSynthesizer::holding());
    let controller = PlaybackController::new(Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>);
    let counters = wire_counters(&controller);

    let first = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            controller.speak("A", &SpeakOptions::default()).await;
        })
    };
    settle().await;

    let second = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            controller.speak("B", &SpeakOptions::default()).await;
        })
    };
    // B's pre-speak cancel concludes A as Stopped; A's completion is stale.
    settle().await;
    first.await.unwrap();

    assert!(synth.release(PlaybackOutcome::Done));
    second.await.unwrap();

    assert_eq!(counters.starts.load(Ordering::SeqCst), 2);
    // Only B's completion counted.
    assert_eq!(counters.completes.load(Ordering::SeqCst), 1);
    assert!(!controller.is_active());
}

#[tokio::test]
async fn stop_speaking_completes_exactly_once_without_engine_callback() {
    let synth = Arc::new(MockSynthesizer::holding());
    // The engine never delivers its own stop callback.
    synth.set_stop_releases(false);
    let controller = PlaybackController::new(Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>);
    let counters = wire_counters(&controller);

    let speaking = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move {
            controller.speak("long announcement", &SpeakOptions::default()).await;
        })
    };
    settle().await;
    assert!(controller.is_active());

    controller.stop_speaking().await;
    assert_eq!(counters.completes.load(Ordering::SeqCst), 1);
    assert!(!controller.is_active());

    // A second stop has nothing to complete.
    controller.stop_speaking().await;
    assert_eq!(counters.completes.load(Ordering::SeqCst), 1);

    // The engine's late conclusion is stale and fires nothing further.
    assert!(synth.release(PlaybackOutcome::Done));
    speaking.await.unwrap();
    assert_eq!(counters.completes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn playback_error_fires_error_then_complete() {
    let synth = Arc::new(MockSynthesizer::new());
    synth.script_outcome(PlaybackOutcome::Error("engine crashed".to_string()));
    let controller = PlaybackController::new(Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>);
    let counters = wire_counters(&controller);

    controller.speak("doomed", &SpeakOptions::default()).await;

    assert_eq!(counters.errors.lock().as_slice(), ["engine crashed"]);
    // The call still concludes; the active flag clears.
    assert_eq!(counters.completes.load(Ordering::SeqCst), 1);
    assert!(!controller.is_active());
}

#[tokio::test]
async fn is_speaking_defaults_to_false_when_the_query_fails() {
    let synth = Arc::new(MockSynthesizer::new());
    synth.set_is_speaking(None);
    let controller = PlaybackController::new(Arc::clone(&synth) as Arc<dyn SpeechSynthesizer>);

    assert!(!controller.is_speaking().await);

    synth.set_is_speaking(Some(true));
    assert!(controller.is_speaking().await);
}
