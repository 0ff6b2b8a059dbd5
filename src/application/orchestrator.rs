//! Segment orchestration state machine
//!
//! Sequences the three segments through capture, processing, upload, and
//! completion. Session events drive its transitions; its commands drive the
//! capture session. Every handler starts with a state check so duplicate or
//! out-of-place input degrades to a no-op instead of corrupting a segment.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::ports::{CaptureDevice, UploadClient};
use crate::application::session::{CaptureSession, SessionEvent};
use crate::domain::segment::{
    CompletedSegment, Segment, SegmentError, SegmentPatch, SegmentStatus, SegmentStore,
};

/// Outcome of finalizing one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// This call finalized the segment and ran the upload
    Finalized,
    /// Another stop path already finalized it; nothing was done
    AlreadyStopped,
}

/// Drives the three-segment capture and upload flow.
///
/// The orchestrator is the only writer of segment status; the upload client
/// and capture session only report results back to it.
pub struct SegmentOrchestrator<D: CaptureDevice, U: UploadClient> {
    session: CaptureSession<D>,
    store: Mutex<SegmentStore>,
    uploader: Arc<U>,
    task_id: String,
}

impl<D, U> SegmentOrchestrator<D, U>
where
    D: CaptureDevice + 'static,
    U: UploadClient,
{
    /// Create an orchestrator for a fresh three-segment flow
    pub fn new(session: CaptureSession<D>, uploader: Arc<U>, task_id: impl Into<String>) -> Self {
        Self {
            session,
            store: Mutex::new(SegmentStore::new()),
            uploader,
            task_id: task_id.into(),
        }
    }

    /// The underlying capture session (read access for UI)
    pub fn session(&self) -> &CaptureSession<D> {
        &self.session
    }

    /// Position of the segment currently being worked on
    pub async fn current_index(&self) -> usize {
        self.store.lock().await.current_index()
    }

    /// Snapshot of the current segment
    pub async fn current_segment(&self) -> Segment {
        self.store.lock().await.current()
    }

    /// Snapshots of all three segments
    pub async fn segments(&self) -> Vec<Segment> {
        self.store.lock().await.all()
    }

    /// Gesture-start: begin recording the current segment.
    ///
    /// No-op unless the segment is pending or failed. When device
    /// acquisition fails the segment moves to `error` carrying the session's
    /// reported reason, leaving the user free to retry the hold.
    pub async fn begin_segment(&self) -> Result<(), SegmentError> {
        let position = {
            let mut store = self.store.lock().await;
            let current = store.current();
            if !matches!(
                current.status(),
                SegmentStatus::Pending | SegmentStatus::Error
            ) {
                // Rapid duplicate input; nothing to do
                return Ok(());
            }
            let position = current.position();
            store.update(position, SegmentPatch::BeginRecording)?;
            position
        };

        if let Err(e) = self.session.start().await {
            let mut store = self.store.lock().await;
            store.update(position, SegmentPatch::CaptureFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Manual stop: gesture release or an explicit stop control
    pub async fn stop_segment(&self) -> Result<StopOutcome, SegmentError> {
        self.finalize_current().await
    }

    /// React to a session event. Only the auto-stop signal affects the
    /// state machine; elapsed and volume events are advisory. An auto-stop
    /// whose epoch predates the current session instance was queued for a
    /// recording that already ended and is dropped.
    pub async fn handle_event(&self, event: &SessionEvent) -> Result<StopOutcome, SegmentError> {
        match event {
            SessionEvent::AutoStop { epoch } => {
                if *epoch != self.session.current_epoch().await {
                    return Ok(StopOutcome::AlreadyStopped);
                }
                self.finalize_current().await
            }
            _ => Ok(StopOutcome::AlreadyStopped),
        }
    }

    /// Shared stop sequence for the auto and manual paths. The
    /// RECORDING -> PROCESSING edge is the tie-break: whichever path takes
    /// it first finalizes; the other observes the segment already out of
    /// RECORDING and backs off.
    async fn finalize_current(&self) -> Result<StopOutcome, SegmentError> {
        let position = {
            let mut store = self.store.lock().await;
            let current = store.current();
            if current.status() != SegmentStatus::Recording {
                return Ok(StopOutcome::AlreadyStopped);
            }
            let position = current.position();
            store.update(position, SegmentPatch::BeginProcessing)?;
            position
        };

        match self.session.stop().await {
            Some(payload) => {
                {
                    let mut store = self.store.lock().await;
                    store.update(position, SegmentPatch::Recorded(payload))?;
                }
                // A recorded segment goes straight to upload
                self.run_upload(position).await?;
            }
            None => {
                let reason = match self.session.last_error().await {
                    Some(e) => e.to_string(),
                    None => "Recording produced no audio".to_string(),
                };
                let mut store = self.store.lock().await;
                store.update(position, SegmentPatch::CaptureFailed(reason))?;
            }
        }
        Ok(StopOutcome::Finalized)
    }

    /// Retry the upload of the current segment with its retained payload.
    ///
    /// Rejected while an upload is in flight and once the retry budget is
    /// exhausted; re-recording is the remaining recovery then.
    pub async fn retry_upload(&self) -> Result<(), SegmentError> {
        let position = self.store.lock().await.current_index();
        self.run_upload(position).await
    }

    /// Upload one recorded segment and record the outcome.
    async fn run_upload(&self, position: usize) -> Result<(), SegmentError> {
        let payload = {
            let mut store = self.store.lock().await;
            let snapshot = store.update(position, SegmentPatch::BeginUpload)?;
            snapshot
                .payload()
                .cloned()
                .ok_or(SegmentError::MissingPayload { position })?
        };

        let result = self.uploader.upload(&payload, &self.task_id, position).await;

        let mut store = self.store.lock().await;
        match result {
            Ok(receipt) => {
                store.update(position, SegmentPatch::Uploaded(receipt.url))?;
            }
            Err(e) => {
                store.update(position, SegmentPatch::UploadFailed(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Re-record request: reset the segment and the capture session so a
    /// fresh hold overwrites it. Allowed from `error` and `uploaded`.
    pub async fn re_record(&self) -> Result<(), SegmentError> {
        {
            let mut store = self.store.lock().await;
            let position = store.current_index();
            store.update(position, SegmentPatch::Reset)?;
        }
        self.session.reset().await;
        Ok(())
    }

    /// Advance to the next segment. Permitted only when the current segment
    /// is uploaded and not the last; resets the session for the new segment.
    pub async fn advance(&self) -> Result<usize, SegmentError> {
        let next = {
            let mut store = self.store.lock().await;
            store.advance()?
        };
        self.session.reset().await;
        Ok(next)
    }

    /// Finalize the whole flow. Permitted only when all three segments are
    /// uploaded; yields the ordered segment list for the playback view.
    pub async fn finish(&self) -> Result<Vec<CompletedSegment>, SegmentError> {
        self.store.lock().await.completed()
    }
}
