//! Infrastructure layer - adapter implementations

pub mod capture;
pub mod config;
pub mod upload;

pub use capture::CpalDevice;
pub use config::XdgConfigStore;
pub use upload::HttpUploadClient;
