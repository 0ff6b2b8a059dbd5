//! Segment store - holds the three segment records and the cursor

use crate::domain::recording::AudioPayload;

use super::record::{
    CompletedSegment, InvalidTransition, Segment, SegmentError, SegmentStatus, SEGMENT_COUNT,
};

/// A validated write against one segment record
#[derive(Debug, Clone)]
pub enum SegmentPatch {
    BeginRecording,
    BeginProcessing,
    Recorded(AudioPayload),
    CaptureFailed(String),
    BeginUpload,
    Uploaded(String),
    UploadFailed(String),
    Reset,
}

/// Pure data holder for exactly three segments with a current cursor.
///
/// All writes go through [`SegmentStore::update`], which validates the
/// transition and returns the new snapshot of the touched segment. Reads
/// return cloned snapshots.
#[derive(Debug)]
pub struct SegmentStore {
    segments: [Segment; SEGMENT_COUNT],
    current: usize,
}

impl SegmentStore {
    /// Create a store with three pending segments and the cursor at 0
    pub fn new() -> Self {
        Self {
            segments: std::array::from_fn(Segment::new),
            current: 0,
        }
    }

    /// Position of the segment currently being worked on
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Whether the cursor is on the last segment
    pub fn on_last_segment(&self) -> bool {
        self.current == SEGMENT_COUNT - 1
    }

    /// Snapshot of the current segment
    pub fn current(&self) -> Segment {
        self.segments[self.current].clone()
    }

    /// Snapshot of the segment at `position`, if in range
    pub fn get(&self, position: usize) -> Option<Segment> {
        self.segments.get(position).cloned()
    }

    /// Snapshots of all three segments in order
    pub fn all(&self) -> Vec<Segment> {
        self.segments.to_vec()
    }

    /// Apply a validated patch to the segment at `position` and return the
    /// new snapshot. Rejects any write that would break the invariants
    /// (e.g. a remote URL outside UPLOADED, an upload without a payload).
    pub fn update(
        &mut self,
        position: usize,
        patch: SegmentPatch,
    ) -> Result<Segment, SegmentError> {
        let segment = self
            .segments
            .get_mut(position)
            .ok_or(SegmentError::Transition(InvalidTransition {
                position,
                current: SegmentStatus::Pending,
                action: "address a segment out of range",
            }))?;

        match patch {
            SegmentPatch::BeginRecording => segment.begin_recording()?,
            SegmentPatch::BeginProcessing => segment.begin_processing()?,
            SegmentPatch::Recorded(payload) => segment.mark_recorded(payload)?,
            SegmentPatch::CaptureFailed(message) => segment.fail_capture(message)?,
            SegmentPatch::BeginUpload => segment.begin_upload()?,
            SegmentPatch::Uploaded(url) => segment.complete_upload(url)?,
            SegmentPatch::UploadFailed(reason) => segment.fail_upload(reason)?,
            SegmentPatch::Reset => segment.reset()?,
        }

        Ok(segment.clone())
    }

    /// Move the cursor to the next segment. Permitted only when the current
    /// segment is uploaded and the cursor is not on the last position.
    pub fn advance(&mut self) -> Result<usize, SegmentError> {
        let segment = &self.segments[self.current];
        if !segment.is_uploaded() {
            return Err(InvalidTransition {
                position: self.current,
                current: segment.status(),
                action: "advance to the next segment",
            }
            .into());
        }
        if self.on_last_segment() {
            return Err(InvalidTransition {
                position: self.current,
                current: segment.status(),
                action: "advance past the last segment",
            }
            .into());
        }
        self.current += 1;
        Ok(self.current)
    }

    /// Number of uploaded segments
    pub fn uploaded_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_uploaded()).count()
    }

    /// Finalize the flow. Only permitted when all three segments are
    /// uploaded; yields the ordered `{position, url}` list for playback.
    pub fn completed(&self) -> Result<Vec<CompletedSegment>, SegmentError> {
        let uploaded = self.uploaded_count();
        if uploaded < SEGMENT_COUNT {
            return Err(SegmentError::Incomplete {
                uploaded,
                total: SEGMENT_COUNT,
            });
        }

        Ok(self
            .segments
            .iter()
            .map(|s| CompletedSegment {
                position: s.position(),
                // remote_url is guaranteed by the uploaded status
                remote_url: s.remote_url().unwrap_or_default().to_string(),
            })
            .collect())
    }
}

impl Default for SegmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::{AudioMimeType, AudioPayload};

    fn payload() -> AudioPayload {
        AudioPayload::new(vec![1u8; 32], AudioMimeType::Wav)
    }

    fn upload_segment(store: &mut SegmentStore, position: usize, url: &str) {
        store.update(position, SegmentPatch::BeginRecording).unwrap();
        store.update(position, SegmentPatch::BeginProcessing).unwrap();
        store
            .update(position, SegmentPatch::Recorded(payload()))
            .unwrap();
        store.update(position, SegmentPatch::BeginUpload).unwrap();
        store
            .update(position, SegmentPatch::Uploaded(url.to_string()))
            .unwrap();
    }

    #[test]
    fn new_store_has_three_pending_segments() {
        let store = SegmentStore::new();
        assert_eq!(store.current_index(), 0);
        assert_eq!(store.all().len(), SEGMENT_COUNT);
        for (i, seg) in store.all().iter().enumerate() {
            assert_eq!(seg.position(), i);
            assert_eq!(seg.status(), SegmentStatus::Pending);
        }
    }

    #[test]
    fn update_returns_new_snapshot() {
        let mut store = SegmentStore::new();
        let snap = store.update(0, SegmentPatch::BeginRecording).unwrap();
        assert_eq!(snap.status(), SegmentStatus::Recording);
        assert_eq!(store.get(0).unwrap().status(), SegmentStatus::Recording);
        // Other segments untouched
        assert_eq!(store.get(1).unwrap().status(), SegmentStatus::Pending);
    }

    #[test]
    fn update_out_of_range_rejected() {
        let mut store = SegmentStore::new();
        assert!(store.update(3, SegmentPatch::BeginRecording).is_err());
    }

    #[test]
    fn invalid_patch_leaves_segment_unchanged() {
        let mut store = SegmentStore::new();
        assert!(store.update(0, SegmentPatch::BeginUpload).is_err());
        assert_eq!(store.get(0).unwrap().status(), SegmentStatus::Pending);
    }

    #[test]
    fn advance_requires_uploaded_current() {
        let mut store = SegmentStore::new();
        assert!(store.advance().is_err());
        assert_eq!(store.current_index(), 0);

        upload_segment(&mut store, 0, "https://store.example/0");
        assert_eq!(store.advance().unwrap(), 1);
        assert_eq!(store.current().position(), 1);
    }

    #[test]
    fn advance_rejected_while_uploading() {
        let mut store = SegmentStore::new();
        store.update(0, SegmentPatch::BeginRecording).unwrap();
        store.update(0, SegmentPatch::BeginProcessing).unwrap();
        store.update(0, SegmentPatch::Recorded(payload())).unwrap();
        store.update(0, SegmentPatch::BeginUpload).unwrap();

        assert!(store.advance().is_err());
        assert_eq!(store.current_index(), 0);
    }

    #[test]
    fn advance_past_last_rejected() {
        let mut store = SegmentStore::new();
        upload_segment(&mut store, 0, "u0");
        store.advance().unwrap();
        upload_segment(&mut store, 1, "u1");
        store.advance().unwrap();
        upload_segment(&mut store, 2, "u2");

        assert!(store.on_last_segment());
        assert!(store.advance().is_err());
        assert_eq!(store.current_index(), 2);
    }

    #[test]
    fn completed_requires_all_uploaded() {
        let mut store = SegmentStore::new();
        upload_segment(&mut store, 0, "u0");
        store.advance().unwrap();

        let err = store.completed().unwrap_err();
        assert!(matches!(err, SegmentError::Incomplete { uploaded: 1, total: 3 }));

        upload_segment(&mut store, 1, "u1");
        store.advance().unwrap();
        upload_segment(&mut store, 2, "u2");

        let list = store.completed().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].remote_url, "u0");
        assert_eq!(list[2].position, 2);
    }
}
