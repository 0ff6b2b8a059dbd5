//! Domain layer - entities, value objects, and errors

pub mod config;
pub mod error;
pub mod recording;
pub mod segment;
