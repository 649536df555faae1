//! Visibility and renderability tests for chunk columns

use crate::math::Frustum;
use crate::world::{ChunkCoord, ChunkProvider, ChunkStatus};

/// Frustum test against the chunk's full-height bounding box.
///
/// The test is conservative: a chunk straddling a frustum plane still
/// counts as visible, so a `true` result never causes a dropped draw.
pub fn is_visible(coord: ChunkCoord, frustum: &Frustum) -> bool {
    frustum.intersects_aabb(&coord.aabb())
}

/// Whether the chunk's data is complete enough to mesh and draw.
///
/// Requires both a `Complete` status and an obtainable surrounding-data
/// view; either can regress independently when the provider invalidates
/// or pages out neighbor data. Such chunks are skipped for the frame,
/// never evicted.
pub fn is_renderable<P: ChunkProvider>(provider: &P, coord: ChunkCoord) -> bool {
    provider.status(coord) == ChunkStatus::Complete && provider.view_ready(coord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::world::chunk::CHUNK_SIZE_X;
    use glam::Vec3;

    struct StatusProvider(ChunkStatus);

    impl ChunkProvider for StatusProvider {
        type View = ();

        fn status(&self, _coord: ChunkCoord) -> ChunkStatus {
            self.0
        }

        fn view_around(&self, _coord: ChunkCoord) -> Option<()> {
            Some(())
        }
    }

    struct ViewlessProvider;

    impl ChunkProvider for ViewlessProvider {
        type View = ();

        fn status(&self, _coord: ChunkCoord) -> ChunkStatus {
            ChunkStatus::Complete
        }

        fn view_around(&self, _coord: ChunkCoord) -> Option<()> {
            None
        }
    }

    fn forward_camera() -> Camera {
        Camera::look_at(
            Vec3::new(8.0, 128.0, 8.0),
            Vec3::new(8.0, 128.0, 200.0),
            Vec3::Y,
        )
    }

    #[test]
    fn chunk_ahead_of_camera_is_visible() {
        let frustum = forward_camera().frustum();
        assert!(is_visible(ChunkCoord::new(0, 4), &frustum));
    }

    #[test]
    fn chunk_behind_camera_is_culled() {
        let camera = forward_camera();
        let frustum = camera.frustum();

        let behind = ChunkCoord::new(0, -20);
        assert!(
            (behind.center().z - camera.position.z).abs() > 10.0 * CHUNK_SIZE_X as f32
        );
        assert!(!is_visible(behind, &frustum));
    }

    #[test]
    fn renderable_tracks_provider_status() {
        let coord = ChunkCoord::new(3, -1);
        assert!(is_renderable(&StatusProvider(ChunkStatus::Complete), coord));
        assert!(!is_renderable(&StatusProvider(ChunkStatus::Pending), coord));
        assert!(!is_renderable(&StatusProvider(ChunkStatus::NotReady), coord));
    }

    #[test]
    fn complete_chunk_without_view_is_not_renderable() {
        assert!(!is_renderable(&ViewlessProvider, ChunkCoord::new(0, 0)));
    }
}
