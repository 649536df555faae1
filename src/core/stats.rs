//! Per-frame streaming statistics

use std::fmt;

/// Counters gathered while building and draining the render queues
///
/// Reset at the start of every frame; read-only for overlays and logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameStats {
    /// Chunks that requested a (re)build this frame
    pub dirty_chunks: u32,
    /// Chunks that passed visibility and readiness tests
    pub visible_chunks: u32,
    /// Render phases skipped: no triangles, or past the billboard cap
    pub ignored_phases: u32,
    /// Chunks inside the frustum whose content was not complete yet
    pub chunks_not_ready: u32,
    /// Segments with no geometry at all in the drawn mesh
    pub empty_segments: u32,
    /// Triangles submitted to the draw sink this frame
    pub rendered_triangles: u64,
}

impl FrameStats {
    /// Clear all counters for a new frame
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dirty: {}, vis: {}, ign: {}, !ready: {}, empty: {}, tri: {}",
            self.dirty_chunks,
            self.visible_chunks,
            self.ignored_phases,
            self.chunks_not_ready,
            self.empty_segments,
            self.rendered_triangles,
        )
    }
}
