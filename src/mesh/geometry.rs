//! Per-segment chunk geometry, partitioned into render phases

use bytemuck::{Pod, Zeroable};

/// Draw-order class of a geometry partition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderPhase {
    /// Solid blocks; order within the phase is irrelevant (depth buffered)
    Opaque,
    /// Blended surfaces drawn back-to-front in two sub-passes
    WaterAndIce,
    /// Alpha-blended vegetation and translucent blocks, distance sorted
    BillboardAndTranslucent,
}

impl RenderPhase {
    pub const ALL: [RenderPhase; 3] = [
        RenderPhase::Opaque,
        RenderPhase::WaterAndIce,
        RenderPhase::BillboardAndTranslucent,
    ];

    pub fn index(self) -> usize {
        match self {
            RenderPhase::Opaque => 0,
            RenderPhase::WaterAndIce => 1,
            RenderPhase::BillboardAndTranslucent => 2,
        }
    }
}

/// Vertex layout shared by all chunk mesh phases
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    /// Combined sun/block light value
    pub light: f32,
}

/// Indexed triangle list for one render phase of one segment
#[derive(Clone, Debug, Default)]
pub struct PhaseGeometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl PhaseGeometry {
    pub fn triangle_count(&self) -> u32 {
        (self.indices.len() / 3) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Geometry of one vertical segment, one partition per render phase
#[derive(Clone, Debug, Default)]
pub struct SegmentGeometry {
    phases: [PhaseGeometry; 3],
}

impl SegmentGeometry {
    pub fn phase(&self, phase: RenderPhase) -> &PhaseGeometry {
        &self.phases[phase.index()]
    }

    pub fn phase_mut(&mut self, phase: RenderPhase) -> &mut PhaseGeometry {
        &mut self.phases[phase.index()]
    }

    pub fn triangle_count(&self, phase: RenderPhase) -> u32 {
        self.phases[phase.index()].triangle_count()
    }

    pub fn total_triangle_count(&self) -> u32 {
        self.phases.iter().map(PhaseGeometry::triangle_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.iter().all(PhaseGeometry::is_empty)
    }

    /// Per-phase triangle counts, indexed by `RenderPhase::index`
    pub fn triangle_counts(&self) -> [u32; 3] {
        [
            self.phases[0].triangle_count(),
            self.phases[1].triangle_count(),
            self.phases[2].triangle_count(),
        ]
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a segment with the given number of triangles per phase
    pub fn segment_with_triangles(opaque: u32, water: u32, billboard: u32) -> SegmentGeometry {
        let mut segment = SegmentGeometry::default();
        for (phase, count) in [
            (RenderPhase::Opaque, opaque),
            (RenderPhase::WaterAndIce, water),
            (RenderPhase::BillboardAndTranslucent, billboard),
        ] {
            let geometry = segment.phase_mut(phase);
            for i in 0..count {
                let base = geometry.vertices.len() as u32;
                geometry.vertices.extend([
                    MeshVertex { position: [i as f32, 0.0, 0.0], ..Default::default() },
                    MeshVertex { position: [i as f32 + 1.0, 0.0, 0.0], ..Default::default() },
                    MeshVertex { position: [i as f32, 1.0, 0.0], ..Default::default() },
                ]);
                geometry.indices.extend([base, base + 1, base + 2]);
            }
        }
        segment
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::segment_with_triangles;
    use super::*;

    #[test]
    fn test_triangle_counts_per_phase() {
        let segment = segment_with_triangles(3, 1, 0);
        assert_eq!(segment.triangle_count(RenderPhase::Opaque), 3);
        assert_eq!(segment.triangle_count(RenderPhase::WaterAndIce), 1);
        assert_eq!(segment.triangle_count(RenderPhase::BillboardAndTranslucent), 0);
        assert_eq!(segment.total_triangle_count(), 4);
        assert_eq!(segment.triangle_counts(), [3, 1, 0]);
    }

    #[test]
    fn test_empty_segment() {
        let segment = SegmentGeometry::default();
        assert!(segment.is_empty());
        assert_eq!(segment.total_triangle_count(), 0);
    }

    #[test]
    fn test_vertex_is_pod() {
        // MeshVertex must be byte-castable for GPU upload
        let vertices = [MeshVertex::default(); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), 2 * std::mem::size_of::<MeshVertex>());
    }
}
