/// CullView: where a cull is performed from.
///
/// A viewpoint, its view frustum, and the near-clip distance used by the
/// portal walk to decide when the viewpoint is "inside" a portal. Passive
/// data: the caller builds one per frame (or per camera).

use glam::{Mat4, Quat, Vec3};
use super::frustum::Frustum;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullView {
    position: Vec3,
    frustum: Frustum,
    near: f32,
}

impl CullView {
    pub fn new(position: Vec3, frustum: Frustum, near: f32) -> Self {
        Self { position, frustum, near: near.max(0.0) }
    }

    /// Perspective view at `position` looking along `rotation * -Z`.
    pub fn perspective(
        position: Vec3,
        rotation: Quat,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        Self::new(
            position,
            Frustum::perspective(position, rotation, fov_y, aspect, near, far),
            near,
        )
    }

    /// View from an existing view-projection matrix.
    pub fn from_view_projection(position: Vec3, view_projection: &Mat4, near: f32) -> Self {
        Self::new(position, Frustum::from_view_projection(view_projection), near)
    }

    // ===== GETTERS =====

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Near-clip distance.
    pub fn near(&self) -> f32 {
        self.near
    }
}

#[cfg(test)]
#[path = "cull_view_tests.rs"]
mod tests;
