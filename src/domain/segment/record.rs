//! Segment entity and its status machine

use std::fmt;
use thiserror::Error;

use crate::domain::recording::AudioPayload;

/// Number of segments composing the final artifact
pub const SEGMENT_COUNT: usize = 3;

/// Maximum upload attempts per segment before retry-upload is rejected
pub const MAX_RETRIES: u32 = 3;

/// Per-segment lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SegmentStatus {
    #[default]
    Pending,
    Recording,
    Processing,
    Recorded,
    Uploading,
    Uploaded,
    Error,
}

impl SegmentStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Recording => "recording",
            Self::Processing => "processing",
            Self::Recorded => "recorded",
            Self::Uploading => "uploading",
            Self::Uploaded => "uploaded",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid status transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid transition for segment {position}: cannot {action} while in {current} state")]
pub struct InvalidTransition {
    pub position: usize,
    pub current: SegmentStatus,
    pub action: &'static str,
}

/// Errors raised by segment transitions
#[derive(Debug, Clone, Error)]
pub enum SegmentError {
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    #[error("Segment {position} has failed {retries} uploads; re-record it instead of retrying")]
    RetryLimitExceeded { position: usize, retries: u32 },

    #[error("Segment {position} already has an upload in flight")]
    UploadInFlight { position: usize },

    #[error("Segment {position} has no captured audio to upload")]
    MissingPayload { position: usize },

    #[error("Only {uploaded} of {total} segments are uploaded")]
    Incomplete { uploaded: usize, total: usize },
}

/// A finalized segment handed to the playback collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedSegment {
    pub position: usize,
    pub remote_url: String,
}

/// One of exactly three independently captured and uploaded audio clips.
///
/// Status machine:
///   PENDING -> RECORDING -> PROCESSING -> RECORDED -> UPLOADING -> UPLOADED
/// with ERROR reachable from RECORDING, PROCESSING, and UPLOADING, and the
/// only backward edges being ERROR -> RECORDING (re-record) and
/// ERROR -> UPLOADING (retry with a retained payload). UPLOADED is terminal
/// until an explicit re-record reset.
///
/// Invariants enforced by construction:
/// - `remote_url` is set if and only if the status is UPLOADED
/// - a payload is present before UPLOADING can be entered
#[derive(Debug, Clone, Default)]
pub struct Segment {
    position: usize,
    status: SegmentStatus,
    payload: Option<AudioPayload>,
    remote_url: Option<String>,
    retry_count: u32,
    error_message: Option<String>,
}

impl Segment {
    /// Create a new pending segment at the given position
    pub fn new(position: usize) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn status(&self) -> SegmentStatus {
        self.status
    }

    pub fn payload(&self) -> Option<&AudioPayload> {
        self.payload.as_ref()
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_uploaded(&self) -> bool {
        self.status == SegmentStatus::Uploaded
    }

    fn invalid(&self, action: &'static str) -> InvalidTransition {
        InvalidTransition {
            position: self.position,
            current: self.status,
            action,
        }
    }

    /// PENDING/ERROR -> RECORDING. Starting over a failed segment is a fresh
    /// capture, so the previous payload, message, and retry count are dropped.
    pub fn begin_recording(&mut self) -> Result<(), InvalidTransition> {
        match self.status {
            SegmentStatus::Pending | SegmentStatus::Error => {
                self.status = SegmentStatus::Recording;
                self.payload = None;
                self.error_message = None;
                self.retry_count = 0;
                Ok(())
            }
            _ => Err(self.invalid("begin recording")),
        }
    }

    /// RECORDING -> PROCESSING. Entered before the capture stop completes so
    /// the stop race is decided at this single edge.
    pub fn begin_processing(&mut self) -> Result<(), InvalidTransition> {
        if self.status != SegmentStatus::Recording {
            return Err(self.invalid("begin processing"));
        }
        self.status = SegmentStatus::Processing;
        Ok(())
    }

    /// PROCESSING -> RECORDED with the captured payload attached
    pub fn mark_recorded(&mut self, payload: AudioPayload) -> Result<(), InvalidTransition> {
        if self.status != SegmentStatus::Processing {
            return Err(self.invalid("attach captured audio"));
        }
        self.status = SegmentStatus::Recorded;
        self.payload = Some(payload);
        Ok(())
    }

    /// RECORDING/PROCESSING -> ERROR when the capture layer failed.
    /// Does not count against the upload retry budget.
    pub fn fail_capture(&mut self, message: impl Into<String>) -> Result<(), InvalidTransition> {
        match self.status {
            SegmentStatus::Recording | SegmentStatus::Processing => {
                self.status = SegmentStatus::Error;
                self.error_message = Some(message.into());
                Ok(())
            }
            _ => Err(self.invalid("record capture failure")),
        }
    }

    /// RECORDED/ERROR -> UPLOADING. From ERROR this is a retry and requires a
    /// retained payload and a retry count below the cap.
    pub fn begin_upload(&mut self) -> Result<(), SegmentError> {
        match self.status {
            SegmentStatus::Uploading => Err(SegmentError::UploadInFlight {
                position: self.position,
            }),
            SegmentStatus::Recorded | SegmentStatus::Error => {
                if self.status == SegmentStatus::Error && self.retry_count >= MAX_RETRIES {
                    return Err(SegmentError::RetryLimitExceeded {
                        position: self.position,
                        retries: self.retry_count,
                    });
                }
                if self.payload.is_none() {
                    return Err(SegmentError::MissingPayload {
                        position: self.position,
                    });
                }
                self.status = SegmentStatus::Uploading;
                self.error_message = None;
                Ok(())
            }
            _ => Err(self.invalid("begin upload").into()),
        }
    }

    /// UPLOADING -> UPLOADED, permanently attaching the remote URL
    pub fn complete_upload(&mut self, url: impl Into<String>) -> Result<(), InvalidTransition> {
        if self.status != SegmentStatus::Uploading {
            return Err(self.invalid("complete upload"));
        }
        self.status = SegmentStatus::Uploaded;
        self.remote_url = Some(url.into());
        Ok(())
    }

    /// UPLOADING -> ERROR, consuming one retry
    pub fn fail_upload(&mut self, reason: impl Into<String>) -> Result<(), InvalidTransition> {
        if self.status != SegmentStatus::Uploading {
            return Err(self.invalid("record upload failure"));
        }
        self.status = SegmentStatus::Error;
        self.retry_count += 1;
        self.error_message = Some(reason.into());
        Ok(())
    }

    /// ERROR/UPLOADED -> PENDING, discarding the payload, URL, message, and
    /// retry count so a fresh capture can overwrite the segment.
    pub fn reset(&mut self) -> Result<(), InvalidTransition> {
        match self.status {
            SegmentStatus::Error | SegmentStatus::Uploaded => {
                *self = Self::new(self.position);
                Ok(())
            }
            _ => Err(self.invalid("reset")),
        }
    }
}
