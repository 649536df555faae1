//! Error types for the streaming core

use thiserror::Error;

/// Main error type for the crate
///
/// The streaming pipeline itself recovers locally from not-ready chunks,
/// stale build results and failed tessellations; errors here only come from
/// the outer surface (configuration loading, GPU setup).
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GPU error: {0}")]
    Gpu(String),
}
