//! Lifecycle bridge
//!
//! Watches application foreground/background transitions and keeps the
//! recognition controller legal: no session may hold the microphone while
//! the app is backgrounded, and continuous listening self-heals on
//! foreground when the persisted preference asks for it.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use crate::recognition::RecognitionController;

/// Coarse application lifecycle state as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppLifecycleState {
    #[default]
    Foreground,
    Background,
}

/// Subscribes once to lifecycle transitions; lives as long as the session
/// manager. Dropping the bridge releases the subscription.
pub struct LifecycleBridge {
    task: JoinHandle<()>,
}

impl LifecycleBridge {
    pub fn spawn(
        mut rx: watch::Receiver<AppLifecycleState>,
        controller: Arc<RecognitionController>,
    ) -> Self {
        // Seed the controller with the current state before any transition
        // arrives, so a manager initialized in the background never arms
        // the microphone via a restart.
        let mut current = *rx.borrow();
        controller.set_foreground(current == AppLifecycleState::Foreground);

        let task = tokio::spawn(async move {
            loop {
                if rx.changed().await.is_err() {
                    // Host dropped its sender; nothing more to observe.
                    break;
                }
                let next = *rx.borrow();
                if next == current {
                    continue;
                }
                current = next;
                match next {
                    AppLifecycleState::Background => {
                        info!(target: "lifecycle", "app backgrounded");
                        controller.set_foreground(false);
                        controller.suspend().await;
                    }
                    AppLifecycleState::Foreground => {
                        info!(target: "lifecycle", "app foregrounded");
                        controller.set_foreground(true);
                        controller.resume_if_enabled().await;
                    }
                }
            }
        });

        Self { task }
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

impl Drop for LifecycleBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}
