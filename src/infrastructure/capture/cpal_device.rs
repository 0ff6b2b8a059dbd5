//! Cross-platform capture device using cpal
//!
//! The cpal stream is not Send, so it lives on a dedicated thread for the
//! whole acquisition; the async side talks to it through shared atomics.
//! Pausing only gates buffering; the stream itself stays open so resume
//! loses no device state.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::oneshot;
use tokio::time::{sleep, Duration as TokioDuration};

use super::wav::package_wav;
use crate::application::ports::{CaptureDevice, CaptureError};
use crate::domain::recording::{AudioMimeType, AudioPayload};

/// Smoothing factor for the rolling volume magnitude
const VOLUME_SMOOTHING: f32 = 0.8;

/// How long to wait for the capture thread to drop the stream
const TEARDOWN_GRACE_MS: u64 = 100;

/// Microphone capture adapter backed by cpal.
pub struct CpalDevice {
    /// Captured samples (mono, i16, at device sample rate)
    buffer: Arc<StdMutex<Vec<i16>>>,
    /// Sample rate the device delivered
    sample_rate: Arc<AtomicU32>,
    /// Whether the stream is held
    capturing: Arc<AtomicBool>,
    /// Pause gate; when set the callback drops incoming frames
    gated: Arc<AtomicBool>,
    /// Rolling mean input magnitude, stored as f32 bits
    volume_bits: Arc<AtomicU32>,
}

impl CpalDevice {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(StdMutex::new(Vec::new())),
            sample_rate: Arc::new(AtomicU32::new(0)),
            capturing: Arc::new(AtomicBool::new(false)),
            gated: Arc::new(AtomicBool::new(false)),
            volume_bits: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Average interleaved frames down to one channel
    fn mix_to_mono(frames: &[i16], channels: u16) -> Vec<i16> {
        if channels <= 1 {
            return frames.to_vec();
        }
        frames
            .chunks(channels as usize)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / channels as i32) as i16
            })
            .collect()
    }

    /// Fold one buffer of samples into the rolling magnitude
    fn update_volume(volume_bits: &AtomicU32, samples: &[i16]) {
        if samples.is_empty() {
            return;
        }
        let mean: f32 = samples
            .iter()
            .map(|&s| (s as f32 / i16::MAX as f32).abs())
            .sum::<f32>()
            / samples.len() as f32;
        let previous = f32::from_bits(volume_bits.load(Ordering::Relaxed));
        let smoothed = previous * VOLUME_SMOOTHING + mean * (1.0 - VOLUME_SMOOTHING);
        volume_bits.store(smoothed.to_bits(), Ordering::Relaxed);
    }

    fn map_build_error(e: cpal::BuildStreamError) -> CaptureError {
        match e {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            cpal::BuildStreamError::BackendSpecific { err }
                if err.description.to_lowercase().contains("permission") =>
            {
                CaptureError::PermissionDenied
            }
            other => CaptureError::Failed(other.to_string()),
        }
    }

    fn map_config_error(e: cpal::DefaultStreamConfigError) -> CaptureError {
        match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            cpal::DefaultStreamConfigError::BackendSpecific { err }
                if err.description.to_lowercase().contains("permission") =>
            {
                CaptureError::PermissionDenied
            }
            other => CaptureError::Failed(other.to_string()),
        }
    }

    /// Runs on the capture thread: open the stream, report startup, and hold
    /// the stream until the capturing flag clears.
    fn run_stream(
        buffer: Arc<StdMutex<Vec<i16>>>,
        sample_rate: Arc<AtomicU32>,
        capturing: Arc<AtomicBool>,
        gated: Arc<AtomicBool>,
        volume_bits: Arc<AtomicU32>,
        ready: oneshot::Sender<Result<(), CaptureError>>,
    ) {
        let startup = (|| {
            let host = cpal::default_host();
            let device = host
                .default_input_device()
                .ok_or(CaptureError::DeviceUnavailable)?;
            let supported = device
                .default_input_config()
                .map_err(Self::map_config_error)?;
            let sample_format = supported.sample_format();
            let config: cpal::StreamConfig = supported.into();
            let channels = config.channels;
            sample_rate.store(config.sample_rate.0, Ordering::SeqCst);

            let on_error = |err| eprintln!("Audio stream error: {}", err);

            let stream = match sample_format {
                cpal::SampleFormat::I16 => {
                    let buffer = Arc::clone(&buffer);
                    let gated = Arc::clone(&gated);
                    let volume_bits = Arc::clone(&volume_bits);
                    device
                        .build_input_stream(
                            &config,
                            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                                if gated.load(Ordering::SeqCst) {
                                    return;
                                }
                                let mono = CpalDevice::mix_to_mono(data, channels);
                                CpalDevice::update_volume(&volume_bits, &mono);
                                if let Ok(mut buffer) = buffer.lock() {
                                    buffer.extend_from_slice(&mono);
                                }
                            },
                            on_error,
                            None,
                        )
                        .map_err(Self::map_build_error)?
                }
                cpal::SampleFormat::F32 => {
                    let buffer = Arc::clone(&buffer);
                    let gated = Arc::clone(&gated);
                    let volume_bits = Arc::clone(&volume_bits);
                    device
                        .build_input_stream(
                            &config,
                            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                                if gated.load(Ordering::SeqCst) {
                                    return;
                                }
                                let as_i16: Vec<i16> =
                                    data.iter().map(|&s| (s * 32767.0) as i16).collect();
                                let mono = CpalDevice::mix_to_mono(&as_i16, channels);
                                CpalDevice::update_volume(&volume_bits, &mono);
                                if let Ok(mut buffer) = buffer.lock() {
                                    buffer.extend_from_slice(&mono);
                                }
                            },
                            on_error,
                            None,
                        )
                        .map_err(Self::map_build_error)?
                }
                other => {
                    return Err(CaptureError::Failed(format!(
                        "Unsupported sample format: {:?}",
                        other
                    )))
                }
            };

            stream
                .play()
                .map_err(|e| CaptureError::Failed(e.to_string()))?;
            Ok(stream)
        })();

        match startup {
            Ok(stream) => {
                let _ = ready.send(Ok(()));
                while capturing.load(Ordering::SeqCst) {
                    std::thread::sleep(std::time::Duration::from_millis(50));
                }
                drop(stream);
            }
            Err(e) => {
                capturing.store(false, Ordering::SeqCst);
                let _ = ready.send(Err(e));
            }
        }
    }
}

impl Default for CpalDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureDevice for CpalDevice {
    async fn acquire(&self) -> Result<(), CaptureError> {
        if self.capturing.swap(true, Ordering::SeqCst) {
            return Err(CaptureError::Failed(
                "Capture already in progress".to_string(),
            ));
        }

        {
            let mut buffer = self.buffer.lock().expect("buffer lock poisoned");
            buffer.clear();
        }
        self.gated.store(false, Ordering::SeqCst);
        self.volume_bits.store(0, Ordering::SeqCst);

        let (ready_tx, ready_rx) = oneshot::channel();
        let buffer = Arc::clone(&self.buffer);
        let sample_rate = Arc::clone(&self.sample_rate);
        let capturing = Arc::clone(&self.capturing);
        let gated = Arc::clone(&self.gated);
        let volume_bits = Arc::clone(&self.volume_bits);

        std::thread::spawn(move || {
            Self::run_stream(buffer, sample_rate, capturing, gated, volume_bits, ready_tx);
        });

        match ready_rx.await {
            Ok(result) => result,
            Err(_) => {
                self.capturing.store(false, Ordering::SeqCst);
                Err(CaptureError::Failed("Capture thread exited".to_string()))
            }
        }
    }

    async fn release(&self) -> Result<AudioPayload, CaptureError> {
        if !self.capturing.swap(false, Ordering::SeqCst) {
            return Err(CaptureError::Failed(
                "No capture in progress".to_string(),
            ));
        }

        // Let the capture thread notice the flag and drop the stream
        sleep(TokioDuration::from_millis(TEARDOWN_GRACE_MS)).await;

        let samples = {
            let mut buffer = self.buffer.lock().expect("buffer lock poisoned");
            std::mem::take(&mut *buffer)
        };
        if samples.is_empty() {
            return Err(CaptureError::Failed("No audio captured".to_string()));
        }

        let rate = self.sample_rate.load(Ordering::SeqCst);
        if rate == 0 {
            return Err(CaptureError::Failed("Sample rate not set".to_string()));
        }

        let bytes = package_wav(&samples, rate)?;
        Ok(AudioPayload::new(bytes, AudioMimeType::Wav))
    }

    async fn discard(&self) {
        let was_capturing = self.capturing.swap(false, Ordering::SeqCst);
        if was_capturing {
            sleep(TokioDuration::from_millis(TEARDOWN_GRACE_MS)).await;
        }
        {
            let mut buffer = self.buffer.lock().expect("buffer lock poisoned");
            buffer.clear();
        }
        self.gated.store(false, Ordering::SeqCst);
        self.volume_bits.store(0, Ordering::SeqCst);
    }

    fn set_paused(&self, paused: bool) {
        self.gated.store(paused, Ordering::SeqCst);
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_to_mono_single_channel_passthrough() {
        let mono = vec![10i16, 20, 30];
        assert_eq!(CpalDevice::mix_to_mono(&mono, 1), mono);
    }

    #[test]
    fn mix_to_mono_averages_pairs() {
        let stereo = vec![100i16, 200, 300, 400];
        assert_eq!(CpalDevice::mix_to_mono(&stereo, 2), vec![150, 350]);
    }

    #[test]
    fn update_volume_tracks_magnitude() {
        let bits = AtomicU32::new(0);
        CpalDevice::update_volume(&bits, &[i16::MAX; 128]);
        let level = f32::from_bits(bits.load(Ordering::Relaxed));
        assert!(level > 0.0 && level <= 1.0);

        // Silence decays the rolling value
        CpalDevice::update_volume(&bits, &[0i16; 128]);
        let decayed = f32::from_bits(bits.load(Ordering::Relaxed));
        assert!(decayed < level);
    }

    #[test]
    fn fresh_device_state() {
        let device = CpalDevice::new();
        assert_eq!(device.volume(), 0.0);
        assert!(!device.capturing.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn release_without_acquire_fails() {
        let device = CpalDevice::new();
        assert!(device.release().await.is_err());
    }

    #[tokio::test]
    async fn discard_is_safe_when_idle() {
        let device = CpalDevice::new();
        device.discard().await;
        device.discard().await;
    }
}
