//! Core types and utilities

pub mod types;
pub mod error;
pub mod logging;
pub mod config;
pub mod camera;
pub mod events;
pub mod stats;

pub use types::*;
pub use error::Error;
pub use config::StreamingConfig;
pub use camera::{Camera, CameraMode};
pub use events::{EventId, EventSink, WorldTimeEvents};
pub use stats::FrameStats;
