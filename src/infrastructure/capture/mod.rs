//! Audio capture adapters

mod cpal_device;
mod wav;

pub use cpal_device::CpalDevice;
pub use wav::package_wav;
