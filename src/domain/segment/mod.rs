//! Segment domain module

mod record;
mod store;

pub use record::{
    CompletedSegment, InvalidTransition, Segment, SegmentError, SegmentStatus, MAX_RETRIES,
    SEGMENT_COUNT,
};
pub use store::{SegmentPatch, SegmentStore};
