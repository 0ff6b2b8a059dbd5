//! Upload client port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::AudioPayload;

/// Upload errors
#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("Upload request failed: {0}")]
    Transport(String),

    #[error("Failed to parse upload response: {0}")]
    Parse(String),
}

/// Successful upload result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Stable remote URL for later playback
    pub url: String,
}

/// Port for transferring one segment's audio to remote storage.
///
/// Must never be invoked concurrently for the same position; the
/// orchestrator guarantees one in-flight upload per segment.
#[async_trait]
pub trait UploadClient: Send + Sync {
    /// Upload a segment payload with its positional metadata.
    async fn upload(
        &self,
        payload: &AudioPayload,
        task_id: &str,
        position: usize,
    ) -> Result<UploadReceipt, UploadError>;
}
