//! Camera state consumed by the streaming pipeline

use crate::core::types::{Vec3, Mat4, Quat};
use crate::math::Frustum;
use crate::world::chunk::ChunkCoord;

/// Which per-frame passes the camera participates in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMode {
    /// Player camera; the first-person pass is rendered.
    FirstPerson,
    /// Detached/orbit camera; the first-person pass is skipped.
    Orbit,
}

/// Camera with position, rotation, projection and pass state
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// Rotation as quaternion
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
    /// Camera mode for pass dispatch
    pub mode: CameraMode,
    /// Mirrored rendering for the reflected scene pass
    reflected: bool,
    /// Y height of the reflection plane (water surface)
    pub reflection_height: f32,
}

impl Camera {
    /// Create a new camera
    pub fn new(position: Vec3, fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near: 0.1,
            far: 1000.0,
            mode: CameraMode::FirstPerson,
            reflected: false,
            reflection_height: 0.0,
        }
    }

    /// Create camera looking at a target
    pub fn look_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);
        let rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward));

        Self {
            position,
            rotation,
            ..Self::new(position, 60.0, 16.0 / 9.0)
        }
    }

    /// Get view matrix (world to camera space)
    ///
    /// When the reflected flag is set, the world is mirrored about the
    /// reflection plane before the regular view transform.
    pub fn view_matrix(&self) -> Mat4 {
        let rotation = Mat4::from_quat(self.rotation.conjugate());
        let translation = Mat4::from_translation(-self.position);
        let view = rotation * translation;

        if self.reflected {
            let mirror = Mat4::from_translation(Vec3::new(0.0, 2.0 * self.reflection_height, 0.0))
                * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
            view * mirror
        } else {
            view
        }
    }

    /// Get projection matrix (camera to clip space)
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Get combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Extract the view frustum for culling
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection())
    }

    /// Toggle the mirrored rendering mode for the reflected scene pass
    pub fn set_reflected(&mut self, reflected: bool) {
        self.reflected = reflected;
    }

    /// Whether the camera is currently in the reflected pass
    pub fn is_reflected(&self) -> bool {
        self.reflected
    }

    /// Chunk coordinate containing the camera position
    pub fn chunk_coord(&self) -> ChunkCoord {
        ChunkCoord::from_world(self.position)
    }

    /// Get forward direction (negative Z in camera space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Set rotation from euler angles (yaw, pitch in radians)
    pub fn set_rotation_euler(&mut self, yaw: f32, pitch: f32) {
        self.rotation = Quat::from_euler(glam::EulerRot::YXZ, yaw, pitch, 0.0);
    }

    /// Update aspect ratio (call on window resize)
    pub fn set_aspect(&mut self, width: f32, height: f32) {
        self.aspect = width / height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frustum_sees_forward() {
        let camera = Camera::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
        let frustum = camera.frustum();
        assert!(frustum.contains_point(Vec3::ZERO));
        // Behind the camera
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 50.0)));
    }

    #[test]
    fn test_chunk_coord_floors_negative() {
        let mut camera = Camera::new(Vec3::new(-0.5, 64.0, 17.0), 60.0, 1.0);
        assert_eq!(camera.chunk_coord(), ChunkCoord::new(-1, 1));

        // Sub-chunk movement keeps the same chunk coordinate
        camera.position.x = -15.9;
        assert_eq!(camera.chunk_coord(), ChunkCoord::new(-1, 1));
    }

    #[test]
    fn test_reflected_view_mirrors_y() {
        let mut camera = Camera::look_at(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
        camera.reflection_height = 0.0;

        let p = Vec3::new(1.0, 3.0, -2.0);
        let plain = camera.view_matrix().transform_point3(Vec3::new(p.x, -p.y, p.z));
        camera.set_reflected(true);
        let mirrored = camera.view_matrix().transform_point3(p);

        assert!((plain - mirrored).length() < 1e-4);
    }
}
