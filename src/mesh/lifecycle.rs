//! Per-chunk mesh lifecycle
//!
//! Every chunk's geometry moves through a small state machine:
//! `NoMesh -> BuildPending -> BuildComplete -> Uploaded -> (disposed) NoMesh`.
//! Background workers only ever produce plain geometry; everything in this
//! module runs on the render thread, which is the sole owner of GPU handles.

use std::collections::HashMap;

use log::trace;

use crate::mesh::geometry::{RenderPhase, SegmentGeometry};
use crate::mesh::heap::{GpuHeap, MeshHandle};
use crate::world::chunk::ChunkCoord;

/// Lifecycle state of a chunk's geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshState {
    /// No geometry and no build in flight
    NoMesh,
    /// A background build is running for this chunk
    BuildPending,
    /// Built geometry is waiting in the pending slot for GPU upload
    BuildComplete,
    /// The active mesh is resident on the GPU
    Uploaded,
}

/// One GPU-resident vertical segment of a chunk's active mesh
#[derive(Clone, Copy, Debug)]
pub struct UploadedSegment {
    pub handle: MeshHandle,
    triangles: [u32; 3],
}

impl UploadedSegment {
    pub fn triangle_count(&self, phase: RenderPhase) -> u32 {
        self.triangles[phase.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.iter().all(|&count| count == 0)
    }
}

/// Mesh bookkeeping for a single chunk
///
/// The pending slot (geometry awaiting upload) is distinct from the active
/// slot (currently renderable segments); the swap replaces the active mesh
/// as a whole, never segment by segment.
pub struct ChunkMesh {
    state: MeshState,
    dirty: bool,
    animated: bool,
    active: Vec<UploadedSegment>,
    pending: Option<Vec<SegmentGeometry>>,
}

impl ChunkMesh {
    fn new() -> Self {
        Self {
            state: MeshState::NoMesh,
            dirty: true,
            animated: false,
            active: Vec::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> MeshState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn set_animated(&mut self, animated: bool) {
        self.animated = animated;
    }

    /// Whether an active mesh is resident
    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Whether a build result is waiting for upload
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Active segments in bottom-up order; empty while not uploaded
    pub fn segments(&self) -> &[UploadedSegment] {
        &self.active
    }

    /// Total triangles of the active mesh in one phase
    pub fn triangle_count(&self, phase: RenderPhase) -> u32 {
        self.active.iter().map(|segment| segment.triangle_count(phase)).sum()
    }
}

/// Render-thread owner of all chunk mesh state and GPU handles
pub struct MeshLifecycle {
    chunks: HashMap<ChunkCoord, ChunkMesh>,
    segment_count: usize,
}

impl MeshLifecycle {
    pub fn new(segment_count: usize) -> Self {
        assert!(segment_count > 0);
        Self {
            chunks: HashMap::new(),
            segment_count,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&ChunkMesh> {
        self.chunks.get(&coord)
    }

    /// Mesh record for a chunk, created on first access
    pub fn entry(&mut self, coord: ChunkCoord) -> &mut ChunkMesh {
        self.chunks.entry(coord).or_insert_with(ChunkMesh::new)
    }

    /// Mark a chunk as having a build in flight
    ///
    /// Returns `false` when a build is already pending or a finished build is
    /// still waiting for upload, keeping at most one outstanding build per
    /// chunk. Clears the dirty flag on success: the flag covers edits the
    /// build being started has not seen, so an edit arriving while the build
    /// runs re-marks the chunk and survives the build's completion.
    pub fn begin_build(&mut self, coord: ChunkCoord) -> bool {
        let mesh = self.entry(coord);
        match mesh.state {
            MeshState::BuildPending | MeshState::BuildComplete => false,
            MeshState::NoMesh | MeshState::Uploaded => {
                mesh.state = MeshState::BuildPending;
                mesh.dirty = false;
                true
            }
        }
    }

    /// Store a finished background build in the pending slot
    ///
    /// The geometry becomes renderable after the next upload step on the
    /// render thread. The dirty flag is left alone: if it was re-set while
    /// the build ran, the chunk still needs another build.
    pub fn store_build(&mut self, coord: ChunkCoord, segments: Vec<SegmentGeometry>) {
        debug_assert_eq!(segments.len(), self.segment_count);
        let mesh = self.entry(coord);
        mesh.pending = Some(segments);
        mesh.state = MeshState::BuildComplete;
    }

    /// Record a failed build: the chunk stays dirty and is retried later
    pub fn fail_build(&mut self, coord: ChunkCoord) {
        let mesh = self.entry(coord);
        if mesh.state == MeshState::BuildPending {
            mesh.state = if mesh.has_active() { MeshState::Uploaded } else { MeshState::NoMesh };
        }
        mesh.dirty = true;
    }

    /// Drop an in-flight build whose chunk left the proximity set
    ///
    /// The chunk is re-marked dirty so a later re-entry rebuilds it.
    pub fn abort_build(&mut self, coord: ChunkCoord) {
        if let Some(mesh) = self.chunks.get_mut(&coord) {
            if mesh.state == MeshState::BuildPending {
                mesh.state = if mesh.has_active() { MeshState::Uploaded } else { MeshState::NoMesh };
            }
            mesh.dirty = true;
        }
    }

    /// Upload the pending mesh and swap it in, disposing the previous one
    ///
    /// Render-thread only. New segments are uploaded before the old ones are
    /// disposed so the chunk never renders a gap; both resource sets exist
    /// briefly. The active slot is replaced as a whole.
    ///
    /// Returns `true` if a swap happened.
    pub fn upload_pending(&mut self, coord: ChunkCoord, heap: &mut dyn GpuHeap) -> bool {
        let Some(mesh) = self.chunks.get_mut(&coord) else {
            return false;
        };
        let Some(pending) = mesh.pending.take() else {
            return false;
        };

        let fresh: Vec<UploadedSegment> = pending
            .iter()
            .map(|segment| UploadedSegment {
                handle: heap.upload(segment),
                triangles: segment.triangle_counts(),
            })
            .collect();

        for old in mesh.active.drain(..) {
            heap.dispose(old.handle);
        }

        mesh.active = fresh;
        mesh.state = MeshState::Uploaded;
        trace!("swapped mesh for chunk {coord:?}");
        true
    }

    /// Release a chunk's GPU resources and reset it to `NoMesh`
    ///
    /// Pending CPU geometry is dropped as well; the chunk is marked dirty so
    /// a later visit rebuilds it.
    pub fn dispose(&mut self, coord: ChunkCoord, heap: &mut dyn GpuHeap) {
        if let Some(mesh) = self.chunks.get_mut(&coord) {
            for segment in mesh.active.drain(..) {
                heap.dispose(segment.handle);
            }
            mesh.pending = None;
            if mesh.state != MeshState::BuildPending {
                mesh.state = MeshState::NoMesh;
            }
            mesh.dirty = true;
        }
    }

    /// Remove a chunk's record entirely, releasing any resources
    pub fn remove(&mut self, coord: ChunkCoord, heap: &mut dyn GpuHeap) {
        self.dispose(coord, heap);
        self.chunks.remove(&coord);
    }

    /// Coordinates of every chunk with a lifecycle record
    pub fn tracked_coords(&self) -> Vec<ChunkCoord> {
        self.chunks.keys().copied().collect()
    }

    /// Coordinates of all chunks currently holding GPU resources
    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        self.chunks
            .iter()
            .filter(|(_, mesh)| mesh.has_active())
            .map(|(&coord, _)| coord)
            .collect()
    }

    /// Number of chunks currently holding GPU resources
    pub fn resident_count(&self) -> usize {
        self.chunks.values().filter(|mesh| mesh.has_active()).count()
    }
}
