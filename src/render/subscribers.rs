//! Draw dispatch interfaces
//!
//! The renderer owns pass ordering; embedders plug in at two seams. A
//! [`DrawSink`] receives every chunk draw with its phase and pass and turns
//! it into actual draw submissions (resolving mesh handles against the
//! heap). [`RenderSubscriber`]s are invoked at fixed points between the
//! chunk passes for non-chunk content such as entities, sky or UI.

use crate::mesh::geometry::RenderPhase;
use crate::mesh::lifecycle::UploadedSegment;
use crate::world::chunk::ChunkCoord;

/// Which pass a chunk draw belongs to.
///
/// Water renders twice per chunk: a depth-only pass that populates the
/// depth buffer without color writes, then a color pass. Surfaces behind
/// the front-most water surface are depth-rejected in the second pass,
/// so overlapping translucent faces never double-blend.
///
/// When reflections are enabled, opaque and billboard chunks additionally
/// render once as `Reflected` before the main scene. The sink renders
/// those draws into the reflection target with the mirrored view
/// transform (see [`Camera::set_reflected`]).
///
/// [`Camera::set_reflected`]: crate::core::camera::Camera::set_reflected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawPass {
    /// Depth writes only, color output masked off
    DepthOnly,
    /// Regular color pass
    Color,
    /// Color pass into the reflection target, view mirrored at the
    /// reflection plane
    Reflected,
}

/// One chunk draw handed to the sink
pub struct ChunkDraw<'a> {
    /// Chunk being drawn
    pub coord: ChunkCoord,
    /// Uploaded segments, bottom segment first
    pub segments: &'a [UploadedSegment],
    /// Whether this chunk animates (wind sway, water motion)
    pub animated: bool,
}

/// Receiver of chunk draw submissions
pub trait DrawSink {
    /// Draw one phase of one chunk.
    ///
    /// Called once per (chunk, phase, pass) with segments carrying the
    /// mesh handles to resolve. Segments whose phase has no geometry
    /// should be skipped by the implementation.
    fn draw_chunk(&mut self, draw: &ChunkDraw<'_>, phase: RenderPhase, pass: DrawPass);
}

/// Hook for non-chunk rendering at fixed points in the frame.
///
/// All methods default to no-ops so a subscriber implements only the
/// stages it cares about.
pub trait RenderSubscriber {
    /// Before opaque chunk geometry (sky, backdrop)
    fn render_opaque(&mut self) {}

    /// After opaque and billboard chunks, before water
    fn render_transparent(&mut self) {}

    /// After all world geometry (selection box, particles)
    fn render_overlay(&mut self) {}

    /// Last stage, only when the camera is first-person (held item)
    fn render_first_person(&mut self) {}
}
