//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod uploader;

// Re-export common types
pub use capture::{CaptureDevice, CaptureError};
pub use config::ConfigStore;
pub use uploader::{UploadClient, UploadError, UploadReceipt};
