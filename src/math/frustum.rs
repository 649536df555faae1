//! View frustum for chunk culling

use crate::core::types::{Vec3, Vec4, Mat4};
use super::aabb::Aabb;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// View frustum as 6 inward-facing planes
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction: each plane is the fourth row of the matrix
    /// plus or minus one of the other rows.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = vp.transpose();
        let rows = [rows.x_axis, rows.y_axis, rows.z_axis, rows.w_axis];

        // (row index, sign): left/right, bottom/top, near/far
        let combos = [
            (0, 1.0), (0, -1.0),
            (1, 1.0), (1, -1.0),
            (2, 1.0), (2, -1.0),
        ];

        let planes = combos.map(|(row, sign): (usize, f32)| {
            Self::normalize_plane(rows[3] + rows[row] * sign)
        });

        Self { planes }
    }

    fn normalize_plane(plane: Vec4) -> Plane {
        let normal = Vec3::new(plane.x, plane.y, plane.z);
        let len = normal.length();
        Plane {
            normal: normal / len,
            distance: plane.w / len,
        }
    }

    /// Check if point is inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Check if an AABB intersects the frustum (conservative)
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            // P-vertex: the corner most aligned with the plane normal.
            // If even that corner is behind the plane, the box is fully out.
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }
}
