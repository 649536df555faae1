//! Chunk coordinates, dimensions and vertical segmentation

use crate::core::types::Vec3;
use crate::math::Aabb;

/// Chunk footprint in blocks
pub const CHUNK_SIZE_X: i32 = 16;
/// Full vertical extent of a chunk column in blocks
pub const CHUNK_SIZE_Y: i32 = 256;
/// Chunk footprint in blocks
pub const CHUNK_SIZE_Z: i32 = 16;

/// Grid coordinate of a chunk column
///
/// Chunks cover the full world height; only x and z vary. The derived `Ord`
/// gives the deterministic tie-break used when two chunks are equally far
/// from the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing a world-space position
    pub fn from_world(pos: Vec3) -> Self {
        Self {
            x: (pos.x.floor() as i32).div_euclid(CHUNK_SIZE_X),
            z: (pos.z.floor() as i32).div_euclid(CHUNK_SIZE_Z),
        }
    }

    /// World-space position of the chunk's minimum corner
    pub fn world_origin(&self) -> Vec3 {
        Vec3::new(
            (self.x * CHUNK_SIZE_X) as f32,
            0.0,
            (self.z * CHUNK_SIZE_Z) as f32,
        )
    }

    /// Horizontal center of the chunk at ground level
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.x as f32 + 0.5) * CHUNK_SIZE_X as f32,
            0.0,
            (self.z as f32 + 0.5) * CHUNK_SIZE_Z as f32,
        )
    }

    /// Distance from the chunk center to a position, measured in the xz plane
    ///
    /// Height is ignored so that proximity ordering does not change when the
    /// viewer moves vertically inside a column.
    pub fn distance_to(&self, pos: Vec3) -> f32 {
        let center = self.center();
        let dx = center.x - pos.x;
        let dz = center.z - pos.z;
        (dx * dx + dz * dz).sqrt()
    }

    /// Bounding box of the full chunk column
    pub fn aabb(&self) -> Aabb {
        let origin = self.world_origin();
        Aabb::new(
            origin,
            origin + Vec3::new(CHUNK_SIZE_X as f32, CHUNK_SIZE_Y as f32, CHUNK_SIZE_Z as f32),
        )
    }
}

/// Generation status of a chunk as reported by the provider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkStatus {
    /// The provider has no data for this coordinate yet
    NotReady,
    /// Content generation is still running
    Pending,
    /// Voxel content is complete
    Complete,
}

/// One vertical slice of a chunk, in blocks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerticalSlice {
    pub start_y: i32,
    pub height: i32,
}

impl VerticalSlice {
    /// Split the chunk height into `count` equal slices, bottom-up
    ///
    /// `count` must divide the chunk height; the config validates this.
    pub fn split(count: usize) -> Vec<VerticalSlice> {
        let height = CHUNK_SIZE_Y / count as i32;
        (0..count as i32)
            .map(|i| VerticalSlice { start_y: i * height, height })
            .collect()
    }

    pub fn end_y(&self) -> i32 {
        self.start_y + self.height
    }
}
