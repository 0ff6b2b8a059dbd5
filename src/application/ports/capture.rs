//! Capture device port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::AudioPayload;

/// Capture errors. Acquisition failures form a small closed set so the
/// session can show a user-facing reason.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone permission was refused")]
    PermissionDenied,

    #[error("No audio input device is available")]
    DeviceUnavailable,

    #[error("Capture failed: {0}")]
    Failed(String),
}

/// Port over a live audio input stream.
///
/// The device is a single exclusively held resource: one acquisition at a
/// time, released exactly once by either `release` or `discard`.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Open the input stream and begin buffering audio.
    ///
    /// Fails with `PermissionDenied` or `DeviceUnavailable` when the device
    /// cannot be acquired; the stream is not held on failure.
    async fn acquire(&self) -> Result<(), CaptureError>;

    /// Close the stream and drain the buffered audio as one payload.
    ///
    /// Fails with `Failed` when nothing was captured.
    async fn release(&self) -> Result<AudioPayload, CaptureError>;

    /// Close the stream and drop any buffered audio.
    /// Safe to call when nothing is acquired.
    async fn discard(&self);

    /// Gate buffering without dropping the stream (pause/resume).
    fn set_paused(&self, paused: bool);

    /// Instantaneous averaged input magnitude, device-relative.
    /// Advisory only; carries no correctness obligation.
    fn volume(&self) -> f32;
}
