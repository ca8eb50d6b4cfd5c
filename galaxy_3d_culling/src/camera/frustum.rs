/// Frustum: six clipping planes for visibility culling.
///
/// Each plane has an inward-pointing normal: a point P is inside the
/// frustum if `plane.distance(P) >= 0` for all planes.
///
/// The caller may build a frustum from camera parameters (`perspective`),
/// extract it from a view-projection matrix (`from_view_projection`), or
/// provide the planes directly (`from_planes`).

use glam::{Mat4, Quat, Vec3, Vec4};
use crate::geometry::{self, FrustumTest, Plane, AABB};

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six frustum planes for culling.
///
/// Works with both perspective and orthographic projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Wrap six planes given in left, right, bottom, top, near, far order.
    pub fn from_planes(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Perspective frustum for a camera at `position` looking along
    /// `rotation * -Z` with `rotation * Y` up.
    ///
    /// `fov_y` is the full vertical field of view in radians, `aspect`
    /// is width / height.
    pub fn perspective(
        position: Vec3,
        rotation: Quat,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let forward = rotation * Vec3::NEG_Z;
        let up = rotation * Vec3::Y;
        let right = rotation * Vec3::X;

        let tan_y = (fov_y * 0.5).tan();
        let tan_x = tan_y * aspect;

        Self {
            planes: [
                Plane::from_point_normal(position, right + forward * tan_x),
                Plane::from_point_normal(position, -right + forward * tan_x),
                Plane::from_point_normal(position, up + forward * tan_y),
                Plane::from_point_normal(position, -up + forward * tan_y),
                Plane::from_point_normal(position + forward * near, forward),
                Plane::from_point_normal(position + forward * far, -forward),
            ],
        }
    }

    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Uses the Gribb & Hartmann method with glam's 0..1 clip depth range
    /// (`perspective_rh`, `orthographic_rh`).
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let m = vp.to_cols_array_2d();

        // Gribb & Hartmann: extract planes from rows of the VP matrix
        let row = |i: usize| Vec4::new(m[0][i], m[1][i], m[2][i], m[3][i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                // Left:   row3 + row0
                Plane::from_vec4(r3 + r0),
                // Right:  row3 - row0
                Plane::from_vec4(r3 - r0),
                // Bottom: row3 + row1
                Plane::from_vec4(r3 + r1),
                // Top:    row3 - row1
                Plane::from_vec4(r3 - r1),
                // Near:   row2 (z_ndc >= 0)
                Plane::from_vec4(r2),
                // Far:    row3 - row2
                Plane::from_vec4(r3 - r2),
            ],
        }
    }

    /// Planes as a slice, for the generic convex-volume tests.
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn near_plane(&self) -> &Plane {
        &self.planes[PLANE_NEAR]
    }

    pub fn far_plane(&self) -> &Plane {
        &self.planes[PLANE_FAR]
    }

    /// Test if an AABB intersects this frustum.
    ///
    /// May return false positives (conservative), never false negatives.
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        geometry::intersects_aabb(&self.planes, aabb)
    }

    /// Classify an AABB against the frustum (3-way test).
    pub fn classify_aabb(&self, aabb: &AABB) -> FrustumTest {
        geometry::classify_aabb(&self.planes, aabb)
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        geometry::contains_point(&self.planes, point)
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
