//! GPU residency for segment meshes
//!
//! All GPU buffers live in a heap and are referred to by opaque generational
//! handles. The mesh lifecycle is the only creator and destroyer of handles;
//! the render step receives handles and looks up buffers at draw time.
//! Creation and destruction happen exclusively on the render thread.

use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::mesh::geometry::{RenderPhase, SegmentGeometry};

/// Opaque handle to one uploaded segment mesh
///
/// Generational: a handle left over from a disposed segment never resolves
/// to a newer occupant of the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    index: u32,
    generation: u32,
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational slot arena backing a heap implementation
struct HandleArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for HandleArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleArena<T> {
    fn new() -> Self {
        Self { slots: Vec::new(), free: Vec::new() }
    }

    fn insert(&mut self, value: T) -> MeshHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.value = Some(value);
            MeshHandle { index, generation: slot.generation }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot { generation: 0, value: Some(value) });
            MeshHandle { index, generation: 0 }
        }
    }

    fn remove(&mut self, handle: MeshHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || slot.value.is_none() {
            return None;
        }
        self.free.push(handle.index);
        slot.value.take()
    }

    fn get(&self, handle: MeshHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

/// Owner of GPU-resident segment meshes
pub trait GpuHeap {
    /// Upload a segment's geometry, returning its handle
    fn upload(&mut self, geometry: &SegmentGeometry) -> MeshHandle;

    /// Release the GPU resources behind a handle
    ///
    /// Stale or double disposals are ignored.
    fn dispose(&mut self, handle: MeshHandle);

    /// Number of currently resident segment meshes
    fn resident_segments(&self) -> usize;
}

/// Vertex and index buffers for one render phase
pub struct PhaseBuffers {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// One uploaded segment: a buffer pair per non-empty phase
pub struct GpuSegmentMesh {
    phases: [Option<PhaseBuffers>; 3],
}

impl GpuSegmentMesh {
    pub fn phase(&self, phase: RenderPhase) -> Option<&PhaseBuffers> {
        self.phases[phase.index()].as_ref()
    }
}

/// wgpu-backed heap creating real vertex/index buffers
pub struct WgpuHeap {
    device: Arc<wgpu::Device>,
    arena: HandleArena<GpuSegmentMesh>,
}

impl WgpuHeap {
    pub fn new(device: Arc<wgpu::Device>) -> Self {
        Self { device, arena: HandleArena::new() }
    }

    /// Resolve a handle to its buffers for draw submission
    pub fn mesh(&self, handle: MeshHandle) -> Option<&GpuSegmentMesh> {
        self.arena.get(handle)
    }

    fn upload_phase(&self, geometry: &SegmentGeometry, phase: RenderPhase) -> Option<PhaseBuffers> {
        let data = geometry.phase(phase);
        if data.is_empty() {
            return None;
        }

        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("chunk_segment_vertices"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("chunk_segment_indices"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Some(PhaseBuffers {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        })
    }
}

impl GpuHeap for WgpuHeap {
    fn upload(&mut self, geometry: &SegmentGeometry) -> MeshHandle {
        let mesh = GpuSegmentMesh {
            phases: RenderPhase::ALL.map(|phase| self.upload_phase(geometry, phase)),
        };
        self.arena.insert(mesh)
    }

    fn dispose(&mut self, handle: MeshHandle) {
        if let Some(mesh) = self.arena.remove(handle) {
            for buffers in mesh.phases.into_iter().flatten() {
                buffers.vertex_buffer.destroy();
                buffers.index_buffer.destroy();
            }
        }
    }

    fn resident_segments(&self) -> usize {
        self.arena.len()
    }
}

/// Headless heap for tests and headless pregeneration runs
///
/// Tracks residency and per-phase triangle counts without any GPU device.
#[derive(Default)]
pub struct CpuHeap {
    arena: HandleArena<[u32; 3]>,
    uploads: usize,
    disposals: usize,
}

impl CpuHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total uploads since creation
    pub fn uploads(&self) -> usize {
        self.uploads
    }

    /// Total disposals since creation
    pub fn disposals(&self) -> usize {
        self.disposals
    }

    /// Triangle counts of a resident segment, indexed by phase
    pub fn triangle_counts(&self, handle: MeshHandle) -> Option<[u32; 3]> {
        self.arena.get(handle).copied()
    }
}

impl GpuHeap for CpuHeap {
    fn upload(&mut self, geometry: &SegmentGeometry) -> MeshHandle {
        self.uploads += 1;
        self.arena.insert(geometry.triangle_counts())
    }

    fn dispose(&mut self, handle: MeshHandle) {
        if self.arena.remove(handle).is_some() {
            self.disposals += 1;
        }
    }

    fn resident_segments(&self) -> usize {
        self.arena.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::geometry::test_support::segment_with_triangles;

    #[test]
    fn test_handles_are_generational() {
        let mut heap = CpuHeap::new();
        let segment = segment_with_triangles(2, 0, 0);

        let first = heap.upload(&segment);
        heap.dispose(first);
        let second = heap.upload(&segment);

        // Slot is reused but the old handle no longer resolves
        assert_ne!(first, second);
        assert!(heap.triangle_counts(first).is_none());
        assert_eq!(heap.triangle_counts(second), Some([2, 0, 0]));
    }

    #[test]
    fn test_double_dispose_is_ignored() {
        let mut heap = CpuHeap::new();
        let handle = heap.upload(&segment_with_triangles(1, 0, 0));
        heap.dispose(handle);
        heap.dispose(handle);
        assert_eq!(heap.disposals(), 1);
        assert_eq!(heap.resident_segments(), 0);
    }

    #[test]
    fn test_resident_count_tracks_live_segments() {
        let mut heap = CpuHeap::new();
        let a = heap.upload(&segment_with_triangles(1, 0, 0));
        let _b = heap.upload(&segment_with_triangles(0, 1, 0));
        assert_eq!(heap.resident_segments(), 2);
        heap.dispose(a);
        assert_eq!(heap.resident_segments(), 1);
    }
}
