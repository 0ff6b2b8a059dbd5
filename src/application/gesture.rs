//! Press-and-hold gesture debounce
//!
//! A press only counts as "start recording" once it has been held
//! uninterrupted for the debounce delay; releasing earlier cancels the
//! pending hold with no side effect and no event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::domain::recording::Duration;

/// Minimum sustained hold before a press is accepted (500 ms)
pub const HOLD_DEBOUNCE_MS: u64 = 500;

/// Events emitted by the gesture controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// The press survived the debounce delay; recording should start
    HoldConfirmed,
    /// A confirmed hold ended; recording should stop
    Released,
}

/// Interprets press/release input with a debounce delay.
pub struct GestureController {
    debounce: Duration,
    events: mpsc::Sender<GestureEvent>,
    pending: Mutex<Option<JoinHandle<()>>>,
    held: Arc<AtomicBool>,
}

impl GestureController {
    /// Create a controller with the default 500 ms debounce
    pub fn new() -> (Self, mpsc::Receiver<GestureEvent>) {
        Self::with_debounce(Duration::from_millis(HOLD_DEBOUNCE_MS))
    }

    /// Create a controller with a custom debounce delay
    pub fn with_debounce(debounce: Duration) -> (Self, mpsc::Receiver<GestureEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (
            Self {
                debounce,
                events: tx,
                pending: Mutex::new(None),
                held: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Whether a hold is currently confirmed
    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }

    /// Register a press. Schedules the debounce; a duplicate press while a
    /// hold is pending or confirmed is ignored.
    pub fn press(&self) {
        let mut pending = self.pending.lock().expect("gesture lock poisoned");
        if pending.is_some() {
            return;
        }

        let held = Arc::clone(&self.held);
        let events = self.events.clone();
        let delay = self.debounce.as_std();
        *pending = Some(tokio::spawn(async move {
            sleep(delay).await;
            held.store(true, Ordering::SeqCst);
            let _ = events.send(GestureEvent::HoldConfirmed).await;
        }));
    }

    /// Register a release. Cancels a pending hold silently; ends a confirmed
    /// hold with a `Released` event.
    pub async fn release(&self) {
        let pending = {
            let mut pending = self.pending.lock().expect("gesture lock poisoned");
            pending.take()
        };

        let Some(handle) = pending else {
            return;
        };
        // Harmless when the debounce task already completed
        handle.abort();

        if self.held.swap(false, Ordering::SeqCst) {
            let _ = self.events.send(GestureEvent::Released).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, Duration as TokioDuration};

    #[tokio::test(start_paused = true)]
    async fn hold_past_debounce_confirms() {
        let (gesture, mut rx) = GestureController::new();

        gesture.press();
        advance(TokioDuration::from_millis(HOLD_DEBOUNCE_MS)).await;

        assert_eq!(rx.recv().await, Some(GestureEvent::HoldConfirmed));
        assert!(gesture.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn early_release_cancels_silently() {
        let (gesture, mut rx) = GestureController::new();

        gesture.press();
        advance(TokioDuration::from_millis(HOLD_DEBOUNCE_MS - 1)).await;
        gesture.release().await;

        advance(TokioDuration::from_millis(HOLD_DEBOUNCE_MS * 2)).await;
        assert!(rx.try_recv().is_err());
        assert!(!gesture.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn release_after_confirmation_emits_released() {
        let (gesture, mut rx) = GestureController::new();

        gesture.press();
        advance(TokioDuration::from_millis(HOLD_DEBOUNCE_MS)).await;
        assert_eq!(rx.recv().await, Some(GestureEvent::HoldConfirmed));

        gesture.release().await;
        assert_eq!(rx.recv().await, Some(GestureEvent::Released));
        assert!(!gesture.is_held());
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_press_is_ignored() {
        let (gesture, mut rx) = GestureController::new();

        gesture.press();
        gesture.press();
        advance(TokioDuration::from_millis(HOLD_DEBOUNCE_MS)).await;

        assert_eq!(rx.recv().await, Some(GestureEvent::HoldConfirmed));
        assert!(rx.try_recv().is_err(), "only one confirmation per hold");
    }

    #[tokio::test(start_paused = true)]
    async fn release_without_press_is_noop() {
        let (gesture, mut rx) = GestureController::new();
        gesture.release().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn custom_debounce_is_honored() {
        let (gesture, mut rx) =
            GestureController::with_debounce(Duration::from_millis(250));

        gesture.press();
        advance(TokioDuration::from_millis(249)).await;
        assert!(rx.try_recv().is_err());

        advance(TokioDuration::from_millis(1)).await;
        assert_eq!(rx.recv().await, Some(GestureEvent::HoldConfirmed));
    }
}
