//! Read-only streaming configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::core::error::Error;
use crate::world::chunk::CHUNK_SIZE_Y;

/// Configuration for the streaming pipeline
///
/// All values are read at construction time; changing the viewing distance at
/// runtime goes through `WorldRenderer::change_viewing_distance` so the
/// proximity set is rebuilt.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Side length (in chunks) of the square proximity region around the viewer.
    /// Must be even: the region spans `[-d/2, d/2)` on both axes.
    pub viewing_distance: i32,
    /// Number of vertical mesh segments per chunk. Fixed for the whole system;
    /// must divide the chunk height evenly.
    pub vertical_segments: usize,
    /// Maximum number of chunks allowed to hold GPU-resident meshes.
    pub max_resident_chunks: usize,
    /// Proximity rank cutoff for the billboard/translucent queue.
    pub max_billboard_chunks: usize,
    /// Proximity rank cutoff for the animated-chunk shader flag.
    pub max_animated_chunks: usize,
    /// Number of concurrent background mesh builds.
    pub build_workers: usize,
    /// Whether the reflected scene pass (mirrored water) is rendered.
    pub reflections_enabled: bool,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            viewing_distance: 16,
            vertical_segments: 2,
            max_resident_chunks: 256,
            max_billboard_chunks: 64,
            max_animated_chunks: 64,
            build_workers: 2,
            reflections_enabled: false,
        }
    }
}

impl StreamingConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency of the configured values
    pub fn validate(&self) -> Result<()> {
        if self.viewing_distance < 2 || self.viewing_distance % 2 != 0 {
            return Err(Error::Config(format!(
                "viewing_distance must be even and >= 2, got {}",
                self.viewing_distance
            )));
        }
        if self.vertical_segments == 0 || CHUNK_SIZE_Y as usize % self.vertical_segments != 0 {
            return Err(Error::Config(format!(
                "vertical_segments must divide the chunk height ({CHUNK_SIZE_Y}), got {}",
                self.vertical_segments
            )));
        }
        if self.build_workers == 0 {
            return Err(Error::Config("build_workers must be at least 1".into()));
        }
        if self.max_resident_chunks == 0 {
            return Err(Error::Config("max_resident_chunks must be at least 1".into()));
        }
        Ok(())
    }
}
