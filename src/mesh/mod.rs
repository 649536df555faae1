//! Chunk mesh geometry, GPU residency and lifecycle

pub mod geometry;
pub mod heap;
pub mod lifecycle;

pub use geometry::{MeshVertex, PhaseGeometry, RenderPhase, SegmentGeometry};
pub use heap::{CpuHeap, GpuHeap, MeshHandle, WgpuHeap};
pub use lifecycle::{ChunkMesh, MeshLifecycle, MeshState, UploadedSegment};
