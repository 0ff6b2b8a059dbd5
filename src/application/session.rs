//! Capture session controller
//!
//! Owns one capture device at a time and the two cadence timers that run
//! while recording: the 1 Hz elapsed-time tick (drives auto-stop) and the
//! 10 Hz volume sampler (advisory UI feedback). Both timers are aborted on
//! every exit path (stop, pause, reset) and every tick re-checks the session
//! epoch so a stale tick can never act on a session that has moved on.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};

use crate::application::ports::{CaptureDevice, CaptureError};
use crate::domain::recording::{AudioPayload, Duration};

/// Elapsed-time tick cadence
pub const ELAPSED_TICK_MS: u64 = 1000;

/// Volume sampling cadence (~10 Hz)
pub const VOLUME_TICK_MS: u64 = 100;

/// Device magnitude treated as full scale when normalizing volume to [0,1]
pub const VOLUME_CEILING: f32 = 0.5;

/// Capacity of the session event channel
const EVENT_BUFFER: usize = 64;

/// Events emitted while a session is recording.
///
/// Every event carries the epoch of the session instance that scheduled it;
/// consumers may drop events whose epoch is stale.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// One more second of recording has elapsed
    Elapsed { epoch: u64, secs: u64 },
    /// Normalized volume sample in [0,1]
    Volume { epoch: u64, level: f32 },
    /// The per-segment limit was reached; fired exactly once per recording.
    /// Delivered to the orchestrator rather than executed internally.
    AutoStop { epoch: u64 },
}

/// Read-only view of the session state
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub is_recording: bool,
    pub is_paused: bool,
    pub elapsed_secs: u64,
    pub volume_level: f32,
    pub last_error: Option<CaptureError>,
    pub has_captured: bool,
}

/// Mutable session state, recreated whole on reset.
/// Invariant: `is_paused` implies `is_recording`.
#[derive(Default)]
struct SessionState {
    is_recording: bool,
    is_paused: bool,
    elapsed_secs: u64,
    volume_level: f32,
    last_error: Option<CaptureError>,
    captured: Option<AudioPayload>,
    auto_stop_fired: bool,
    stopping: bool,
    epoch: u64,
    tickers: Vec<JoinHandle<()>>,
}

impl SessionState {
    fn abort_tickers(&mut self) {
        for handle in self.tickers.drain(..) {
            handle.abort();
        }
    }
}

/// Recording session controller.
///
/// The session is the only owner of the device handle and of its own state;
/// the orchestrator drives it exclusively through commands.
pub struct CaptureSession<D: CaptureDevice> {
    device: Arc<D>,
    state: Arc<Mutex<SessionState>>,
    events: mpsc::Sender<SessionEvent>,
    limit: Duration,
}

impl<D: CaptureDevice + 'static> CaptureSession<D> {
    /// Create a session around a device with the given per-recording limit.
    /// Returns the session and the receiving end of its event stream.
    pub fn new(device: Arc<D>, limit: Duration) -> (Self, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (
            Self {
                device,
                state: Arc::new(Mutex::new(SessionState::default())),
                events: tx,
                limit,
            },
            rx,
        )
    }

    /// Request device access and begin capture, timing, and volume sampling.
    ///
    /// On acquisition failure the state is left unchanged apart from
    /// `last_error`; the caller decides whether to retry. A start while
    /// already recording is a duplicate-input no-op.
    pub async fn start(&self) -> Result<(), CaptureError> {
        {
            let state = self.state.lock().await;
            if state.is_recording {
                return Ok(());
            }
        }

        if let Err(e) = self.device.acquire().await {
            let mut state = self.state.lock().await;
            state.last_error = Some(e.clone());
            return Err(e);
        }

        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.is_recording = true;
        state.is_paused = false;
        state.elapsed_secs = 0;
        state.volume_level = 0.0;
        state.auto_stop_fired = false;
        state.stopping = false;
        state.captured = None;
        state.last_error = None;
        let epoch = state.epoch;
        state.tickers = self.spawn_tickers(epoch);
        Ok(())
    }

    /// Finalize capture, release the device, and return the accumulated
    /// payload. Returns None when no active capture exists or when another
    /// stop is already finalizing, so auto-stop and manual stop racing on
    /// the same session produce exactly one finalization.
    pub async fn stop(&self) -> Option<AudioPayload> {
        {
            let mut state = self.state.lock().await;
            if !state.is_recording || state.stopping {
                return None;
            }
            state.stopping = true;
            state.abort_tickers();
        }

        let released = self.device.release().await;

        let mut state = self.state.lock().await;
        state.is_recording = false;
        state.is_paused = false;
        state.stopping = false;
        state.epoch += 1;
        match released {
            Ok(payload) => {
                state.captured = Some(payload.clone());
                Some(payload)
            }
            Err(e) => {
                state.last_error = Some(e);
                None
            }
        }
    }

    /// Suspend timing and volume sampling without releasing the device.
    /// No-op unless actively recording.
    pub async fn pause(&self) {
        let mut state = self.state.lock().await;
        if !state.is_recording || state.is_paused || state.stopping {
            return;
        }
        state.is_paused = true;
        state.epoch += 1;
        state.abort_tickers();
        self.device.set_paused(true);
    }

    /// Re-arm timing and volume sampling from the paused elapsed time.
    /// No-op unless paused.
    pub async fn resume(&self) {
        let mut state = self.state.lock().await;
        if !state.is_paused || state.stopping {
            return;
        }
        state.is_paused = false;
        state.epoch += 1;
        self.device.set_paused(false);
        let epoch = state.epoch;
        state.tickers = self.spawn_tickers(epoch);
    }

    /// Unconditionally release any held device, drop any buffered or
    /// captured audio, and return to the never-started condition.
    /// Safe to call in any state; waits for the device release to complete
    /// before returning so a follow-up start finds the device free.
    pub async fn reset(&self) {
        {
            let mut state = self.state.lock().await;
            state.abort_tickers();
            let epoch = state.epoch + 1;
            *state = SessionState {
                epoch,
                ..Default::default()
            };
            self.device.set_paused(false);
        }
        self.device.discard().await;
    }

    /// Current state snapshot
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            is_recording: state.is_recording,
            is_paused: state.is_paused,
            elapsed_secs: state.elapsed_secs,
            volume_level: state.volume_level,
            last_error: state.last_error.clone(),
            has_captured: state.captured.is_some(),
        }
    }

    /// Elapsed recording time in whole seconds
    pub async fn elapsed_secs(&self) -> u64 {
        self.state.lock().await.elapsed_secs
    }

    /// Last capture-layer error, if any
    pub async fn last_error(&self) -> Option<CaptureError> {
        self.state.lock().await.last_error.clone()
    }

    /// Epoch of the current session instance. Events carrying an older
    /// epoch were scheduled for a recording that has since ended.
    pub async fn current_epoch(&self) -> u64 {
        self.state.lock().await.epoch
    }

    fn spawn_tickers(&self, epoch: u64) -> Vec<JoinHandle<()>> {
        vec![self.spawn_elapsed_ticker(epoch), self.spawn_volume_ticker(epoch)]
    }

    fn spawn_elapsed_ticker(&self, epoch: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let limit_secs = self.limit.as_secs();

        tokio::spawn(async move {
            let mut ticker = interval(TokioDuration::from_millis(ELAPSED_TICK_MS));
            // First interval tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;

                let (secs, fire_auto_stop) = {
                    let mut state = state.lock().await;
                    if state.epoch != epoch {
                        return;
                    }
                    if !state.is_recording || state.is_paused || state.stopping {
                        continue;
                    }
                    state.elapsed_secs += 1;
                    let fire = state.elapsed_secs >= limit_secs && !state.auto_stop_fired;
                    if fire {
                        state.auto_stop_fired = true;
                    }
                    (state.elapsed_secs, fire)
                };

                let _ = events.send(SessionEvent::Elapsed { epoch, secs }).await;
                if fire_auto_stop {
                    let _ = events.send(SessionEvent::AutoStop { epoch }).await;
                }
            }
        })
    }

    fn spawn_volume_ticker(&self, epoch: u64) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let device = Arc::clone(&self.device);

        tokio::spawn(async move {
            let mut ticker = interval(TokioDuration::from_millis(VOLUME_TICK_MS));
            ticker.tick().await;
            loop {
                ticker.tick().await;

                let level = (device.volume() / VOLUME_CEILING).clamp(0.0, 1.0);
                {
                    let mut state = state.lock().await;
                    if state.epoch != epoch {
                        return;
                    }
                    if !state.is_recording || state.is_paused || state.stopping {
                        continue;
                    }
                    state.volume_level = level;
                }

                let _ = events.send(SessionEvent::Volume { epoch, level }).await;
            }
        })
    }
}
