//! Residency budget for GPU-resident chunk meshes
//!
//! Runs every frame after queue building. Chunks past the budget index in
//! proximity order are disposed back to `NoMesh`, and chunks that left
//! proximity entirely have their lifecycle records removed. This bounds both
//! GPU memory and the per-chunk bookkeeping no matter how far the viewer
//! travels, trading a rebuild on the next visit for memory safety.

use log::debug;

use crate::mesh::heap::GpuHeap;
use crate::mesh::lifecycle::MeshLifecycle;
use crate::streaming::proximity::ProximityIndex;

/// Enforces the maximum number of chunks holding GPU resources
pub struct ResidencyBudget {
    max_resident: usize,
}

impl ResidencyBudget {
    pub fn new(max_resident: usize) -> Self {
        Self { max_resident }
    }

    pub fn max_resident(&self) -> usize {
        self.max_resident
    }

    /// Dispose every over-budget chunk and drop records of departed chunks
    ///
    /// Because the proximity set is distance ascending, everything past the
    /// budget index is farther from the viewer than everything before it, so
    /// the nearest chunks are always the ones kept. Chunks outside proximity
    /// lose their lifecycle records entirely, pending-only geometry included.
    ///
    /// Returns the number of chunks that had resources released.
    pub fn enforce(
        &self,
        proximity: &ProximityIndex,
        lifecycle: &mut MeshLifecycle,
        heap: &mut dyn GpuHeap,
    ) -> usize {
        let mut disposed = 0;

        for &coord in proximity.coords().iter().skip(self.max_resident) {
            let holds_resources = lifecycle
                .get(coord)
                .is_some_and(|mesh| mesh.has_active() || mesh.has_pending());
            if holds_resources {
                lifecycle.dispose(coord, heap);
                disposed += 1;
            }
        }

        for coord in lifecycle.tracked_coords() {
            if !proximity.contains(coord) {
                let holds_resources = lifecycle
                    .get(coord)
                    .is_some_and(|mesh| mesh.has_active() || mesh.has_pending());
                lifecycle.remove(coord, heap);
                if holds_resources {
                    disposed += 1;
                }
            }
        }

        if disposed > 0 {
            debug!(
                "residency budget disposed {disposed} chunks ({} resident, budget {})",
                lifecycle.resident_count(),
                self.max_resident
            );
        }
        disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::geometry::test_support::segment_with_triangles;
    use crate::mesh::heap::CpuHeap;
    use crate::world::chunk::{ChunkCoord, ChunkStatus};
    use crate::world::provider::ChunkProvider;

    struct AlwaysReady;

    impl ChunkProvider for AlwaysReady {
        type View = ();

        fn status(&self, _: ChunkCoord) -> ChunkStatus {
            ChunkStatus::Complete
        }

        fn view_around(&self, _: ChunkCoord) -> Option<()> {
            Some(())
        }
    }

    fn upload_all(
        proximity: &ProximityIndex,
        lifecycle: &mut MeshLifecycle,
        heap: &mut CpuHeap,
    ) {
        for coord in proximity.iter() {
            lifecycle.begin_build(coord);
            lifecycle.store_build(coord, vec![segment_with_triangles(1, 0, 0)]);
            lifecycle.upload_pending(coord, heap);
        }
    }

    fn proximity_at_origin(viewing_distance: i32) -> ProximityIndex {
        let mut proximity = ProximityIndex::new(viewing_distance);
        let viewer = ChunkCoord::new(0, 0);
        proximity.update(viewer, viewer.center(), false, &AlwaysReady);
        proximity
    }

    #[test]
    fn test_resident_count_capped() {
        let proximity = proximity_at_origin(4);
        let mut lifecycle = MeshLifecycle::new(1);
        let mut heap = CpuHeap::new();
        upload_all(&proximity, &mut lifecycle, &mut heap);
        assert_eq!(lifecycle.resident_count(), 16);

        let budget = ResidencyBudget::new(10);
        let disposed = budget.enforce(&proximity, &mut lifecycle, &mut heap);

        assert_eq!(disposed, 6);
        assert_eq!(lifecycle.resident_count(), 10);
        assert_eq!(heap.resident_segments(), 10);
    }

    #[test]
    fn test_disposed_chunks_are_farther_than_retained() {
        let proximity = proximity_at_origin(6);
        let mut lifecycle = MeshLifecycle::new(1);
        let mut heap = CpuHeap::new();
        upload_all(&proximity, &mut lifecycle, &mut heap);

        let budget = ResidencyBudget::new(12);
        budget.enforce(&proximity, &mut lifecycle, &mut heap);

        let viewer = ChunkCoord::new(0, 0).center();
        let max_retained = lifecycle
            .resident_coords()
            .iter()
            .map(|c| c.distance_to(viewer))
            .fold(0.0_f32, f32::max);
        let min_disposed = proximity
            .iter()
            .filter(|&c| !lifecycle.get(c).unwrap().has_active())
            .map(|c| c.distance_to(viewer))
            .fold(f32::INFINITY, f32::min);
        assert!(max_retained <= min_disposed);
    }

    #[test]
    fn test_out_of_proximity_residents_disposed() {
        let mut proximity = proximity_at_origin(4);
        let mut lifecycle = MeshLifecycle::new(1);
        let mut heap = CpuHeap::new();
        upload_all(&proximity, &mut lifecycle, &mut heap);

        // Viewer teleports far away: the old residents are all out of range
        let far = ChunkCoord::new(100, 100);
        proximity.update(far, far.center(), false, &AlwaysReady);

        let budget = ResidencyBudget::new(64);
        let disposed = budget.enforce(&proximity, &mut lifecycle, &mut heap);

        assert_eq!(disposed, 16);
        assert_eq!(lifecycle.resident_count(), 0);
        assert_eq!(heap.resident_segments(), 0);
        // Departed chunks keep no bookkeeping either
        assert!(lifecycle.tracked_coords().is_empty());
    }

    #[test]
    fn test_departed_pending_only_chunk_is_removed() {
        let mut proximity = proximity_at_origin(4);
        let mut lifecycle = MeshLifecycle::new(1);
        let mut heap = CpuHeap::new();

        // Built geometry waiting for upload when the viewer leaves
        let coord = ChunkCoord::new(0, 0);
        lifecycle.begin_build(coord);
        lifecycle.store_build(coord, vec![segment_with_triangles(1, 0, 0)]);
        assert!(lifecycle.get(coord).is_some_and(|mesh| mesh.has_pending()));

        let far = ChunkCoord::new(100, 100);
        proximity.update(far, far.center(), false, &AlwaysReady);

        let budget = ResidencyBudget::new(64);
        let disposed = budget.enforce(&proximity, &mut lifecycle, &mut heap);

        assert_eq!(disposed, 1);
        assert!(lifecycle.get(coord).is_none());
        assert_eq!(heap.uploads(), 0);
    }

    #[test]
    fn test_under_budget_is_untouched() {
        let proximity = proximity_at_origin(4);
        let mut lifecycle = MeshLifecycle::new(1);
        let mut heap = CpuHeap::new();
        upload_all(&proximity, &mut lifecycle, &mut heap);

        let budget = ResidencyBudget::new(64);
        assert_eq!(budget.enforce(&proximity, &mut lifecycle, &mut heap), 0);
        assert_eq!(lifecycle.resident_count(), 16);
    }
}
