//! Proximity index: the set of chunks near the viewer
//!
//! Membership is a square region of side `viewing_distance` centered on the
//! viewer's chunk. The set only changes when the viewer crosses a chunk
//! boundary, a rebuild is forced, or a previously not-ready chunk is retried;
//! sub-chunk movement is a no-op. The set is kept sorted by ascending
//! distance to the viewer, which later stages use as the priority order for
//! animation and billboard budgets.

use std::collections::HashSet;

use log::debug;

use crate::core::types::Vec3;
use crate::math::Rect2i;
use crate::world::chunk::{ChunkCoord, ChunkStatus};
use crate::world::provider::ChunkProvider;

/// Distance-ordered set of chunk coordinates around the viewer
pub struct ProximityIndex {
    /// Members sorted ascending by distance to the viewer
    coords: Vec<ChunkCoord>,
    members: HashSet<ChunkCoord>,
    /// Coordinates inside the region that were not ready on their last test.
    /// Tracked per coordinate so a retry never rebuilds the whole set.
    retry: HashSet<ChunkCoord>,
    viewer_chunk: Option<ChunkCoord>,
    viewing_distance: i32,
}

impl ProximityIndex {
    pub fn new(viewing_distance: i32) -> Self {
        Self {
            coords: Vec::new(),
            members: HashSet::new(),
            retry: HashSet::new(),
            viewer_chunk: None,
            viewing_distance,
        }
    }

    /// Change the viewing distance; the caller forces a rebuild on the next
    /// update
    pub fn set_viewing_distance(&mut self, viewing_distance: i32) {
        self.viewing_distance = viewing_distance;
    }

    pub fn viewing_distance(&self) -> i32 {
        self.viewing_distance
    }

    /// Members in ascending distance order
    pub fn coords(&self) -> &[ChunkCoord] {
        &self.coords
    }

    pub fn iter(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.coords.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.members.contains(&coord)
    }

    /// Position of a chunk in the distance ordering
    pub fn rank(&self, coord: ChunkCoord) -> Option<usize> {
        self.coords.iter().position(|&c| c == coord)
    }

    /// Whether some chunks in the region are still waiting to become ready
    pub fn has_retries(&self) -> bool {
        !self.retry.is_empty()
    }

    fn region_around(&self, chunk: ChunkCoord) -> Rect2i {
        let half = self.viewing_distance / 2;
        Rect2i::new(chunk.x - half, chunk.z - half, half * 2, half * 2)
    }

    fn is_ready<P: ChunkProvider>(provider: &P, coord: ChunkCoord) -> bool {
        provider.status(coord) == ChunkStatus::Complete && provider.view_ready(coord)
    }

    /// Add the coordinate if its chunk is ready, otherwise record it for
    /// retry. Returns whether membership changed.
    fn try_add<P: ChunkProvider>(&mut self, coord: ChunkCoord, provider: &P) -> bool {
        if Self::is_ready(provider, coord) {
            self.retry.remove(&coord);
            self.members.insert(coord)
        } else {
            self.retry.insert(coord);
            false
        }
    }

    /// Recompute membership around the viewer's chunk
    ///
    /// Returns `true` if the set was recomputed (viewer moved, forced, or a
    /// retried chunk became ready); `false` for the idempotent no-op case.
    pub fn update<P: ChunkProvider>(
        &mut self,
        viewer_chunk: ChunkCoord,
        viewer_pos: Vec3,
        force: bool,
        provider: &P,
    ) -> bool {
        let moved = self.viewer_chunk != Some(viewer_chunk);
        if !moved && !force && self.retry.is_empty() {
            return false;
        }

        let new_region = self.region_around(viewer_chunk);
        let mut changed = false;

        if self.members.is_empty() || force || self.viewer_chunk.is_none() {
            // Full rebuild
            self.members.clear();
            self.retry.clear();
            for (x, z) in new_region.coords() {
                self.try_add(ChunkCoord::new(x, z), provider);
            }
            changed = true;
        } else {
            if moved {
                // Incremental: only the symmetric difference of the old and
                // new regions is touched.
                let old_region = self.region_around(self.viewer_chunk.unwrap());

                for rect in old_region.subtract(&new_region) {
                    for (x, z) in rect.coords() {
                        let coord = ChunkCoord::new(x, z);
                        changed |= self.members.remove(&coord);
                        self.retry.remove(&coord);
                    }
                }
                for rect in new_region.subtract(&old_region) {
                    for (x, z) in rect.coords() {
                        changed |= self.try_add(ChunkCoord::new(x, z), provider);
                    }
                }
            }

            // Retry previously not-ready chunks still inside the region
            let retries: Vec<ChunkCoord> = self
                .retry
                .iter()
                .copied()
                .filter(|c| new_region.contains(c.x, c.z))
                .collect();
            for coord in retries {
                changed |= self.try_add(coord, provider);
            }
        }

        self.viewer_chunk = Some(viewer_chunk);

        if moved || changed {
            self.coords = self.members.iter().copied().collect();
            self.coords.sort_by(|a, b| {
                a.distance_to(viewer_pos)
                    .total_cmp(&b.distance_to(viewer_pos))
                    .then_with(|| a.cmp(b))
            });
            debug!(
                "proximity set updated: {} chunks, {} awaiting retry",
                self.coords.len(),
                self.retry.len()
            );
        }

        moved || force || changed
    }
}
