//! Per-frame render queues
//!
//! Queues are rebuilt from scratch every frame and drained exactly once:
//! [`RenderQueues`] collects chunk coordinates during queue building, then
//! [`RenderQueues::drain`] consumes it into flat draw lists for the frame.
//! Nothing carries over to the next frame.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::world::chunk::ChunkCoord;

/// Heap entry ordering distance-sorted phases.
///
/// The `BinaryHeap` is a max-heap, so the largest distance pops first and
/// draining yields chunks far to near. Ties fall back to the coordinate
/// ordering so the drain order is deterministic.
#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    coord: ChunkCoord,
    distance: f32,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.coord.cmp(&other.coord))
    }
}

/// Per-phase draw queues for one frame.
///
/// Opaque geometry keeps insertion order, which is already near-to-far
/// because queue building walks the proximity list by rank. Water and
/// billboard geometry sort far to near for correct alpha compositing.
#[derive(Debug, Default)]
pub struct RenderQueues {
    opaque: Vec<ChunkCoord>,
    water: BinaryHeap<QueueEntry>,
    billboard: BinaryHeap<QueueEntry>,
}

impl RenderQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_opaque(&mut self, coord: ChunkCoord) {
        self.opaque.push(coord);
    }

    pub fn push_water(&mut self, coord: ChunkCoord, distance: f32) {
        self.water.push(QueueEntry { coord, distance });
    }

    pub fn push_billboard(&mut self, coord: ChunkCoord, distance: f32) {
        self.billboard.push(QueueEntry { coord, distance });
    }

    pub fn opaque_len(&self) -> usize {
        self.opaque.len()
    }

    pub fn water_len(&self) -> usize {
        self.water.len()
    }

    pub fn billboard_len(&self) -> usize {
        self.billboard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.water.is_empty() && self.billboard.is_empty()
    }

    /// Consume the queues into ordered draw lists.
    pub fn drain(self) -> DrawLists {
        let drain_heap = |mut heap: BinaryHeap<QueueEntry>| {
            let mut coords = Vec::with_capacity(heap.len());
            while let Some(entry) = heap.pop() {
                coords.push(entry.coord);
            }
            coords
        };

        DrawLists {
            opaque: self.opaque,
            water: drain_heap(self.water),
            billboard: drain_heap(self.billboard),
        }
    }
}

/// Flat per-phase draw order for one frame
#[derive(Debug)]
pub struct DrawLists {
    /// Opaque chunks in proximity rank order (near to far)
    pub opaque: Vec<ChunkCoord>,
    /// Water and ice chunks, far to near
    pub water: Vec<ChunkCoord>,
    /// Billboard and translucent chunks, far to near
    pub billboard: Vec<ChunkCoord>,
}
