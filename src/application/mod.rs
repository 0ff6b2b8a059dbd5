//! Application layer - use cases and ports

pub mod gesture;
pub mod orchestrator;
pub mod ports;
pub mod session;

pub use gesture::{GestureController, GestureEvent, HOLD_DEBOUNCE_MS};
pub use orchestrator::{SegmentOrchestrator, StopOutcome};
pub use session::{CaptureSession, SessionEvent, SessionSnapshot};
