//! Trivox - press-and-hold voice segment recorder
//!
//! This crate captures exactly three short spoken audio segments from the
//! microphone via a press-and-hold gesture, enforces a per-segment duration
//! limit with automatic stop, and uploads every segment to remote storage
//! with bounded retry, producing three stable playback URLs.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Segment records, the per-segment status machine, value objects
//! - **Application**: The capture session, gesture debounce, segment
//!   orchestrator, and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal capture, HTTP upload,
//!   XDG config)
//! - **CLI**: Command-line interface and the interactive recording loop

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
