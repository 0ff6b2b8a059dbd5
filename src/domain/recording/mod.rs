//! Recording domain module

mod audio;
mod duration;

pub use audio::{AudioMimeType, AudioPayload};
pub use duration::{Duration, SEGMENT_DURATION_SECS};
