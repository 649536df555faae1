//! Contracts for the external world data source and mesh builder
//!
//! The streaming core never generates or stores voxel content itself; it asks
//! a `ChunkProvider` for readiness and data views, and hands views to a
//! `Tessellator` on background workers.

use crate::mesh::geometry::SegmentGeometry;
use crate::world::chunk::{ChunkCoord, ChunkStatus, VerticalSlice};

/// Source of chunk content and surrounding-data views
///
/// `View` is an owned snapshot of a chunk plus enough neighbor data to
/// tessellate it safely. It is moved onto a background worker, so it must be
/// `Send` and self-contained.
pub trait ChunkProvider {
    type View: Send + 'static;

    /// Generation status for a coordinate; may report `NotReady` transiently
    fn status(&self, coord: ChunkCoord) -> ChunkStatus;

    /// Snapshot of the chunk and its loaded neighbors, or `None` while the
    /// surrounding data is not available yet
    fn view_around(&self, coord: ChunkCoord) -> Option<Self::View>;

    /// Whether `view_around` would currently succeed
    ///
    /// Called once per chunk per frame; providers that can answer without
    /// materializing a snapshot should override this.
    fn view_ready(&self, coord: ChunkCoord) -> bool {
        self.view_around(coord).is_some()
    }

    /// Per-frame housekeeping (paging, cache trimming)
    fn update(&mut self) {}
}

/// Builds the geometry of one vertical slice of a chunk
///
/// Pure function of the view, coordinate and slice bounds. Returning `None`
/// means the slice could not be built (missing data); the chunk stays dirty
/// and is retried on a later frame.
pub trait Tessellator<V>: Send + Sync + 'static {
    fn build(&self, view: &V, coord: ChunkCoord, slice: VerticalSlice) -> Option<SegmentGeometry>;
}

impl<V, F> Tessellator<V> for F
where
    F: Fn(&V, ChunkCoord, VerticalSlice) -> Option<SegmentGeometry> + Send + Sync + 'static,
{
    fn build(&self, view: &V, coord: ChunkCoord, slice: VerticalSlice) -> Option<SegmentGeometry> {
        self(view, coord, slice)
    }
}
