/// Occluder: a planar convex hull that hides whatever lies behind it.
///
/// The hull is stored in local space with a world transform. Seen from a
/// viewpoint in front of the hull plane, the occluder defines a convex
/// volume (edge planes through the viewpoint plus the back-facing hull
/// plane); anything fully inside that volume is hidden.
///
/// With `auto_orient`, the hull is rotated about its center each cull so
/// its face turns toward the viewpoint (billboard occluders). One axis
/// restricts the rotation to that world axis; two or more allow any
/// rotation.

use bitflags::bitflags;
use glam::{Mat4, Quat, Vec3};
use slotmap::new_key_type;
use crate::geometry::{
    frustum_planes_from_polygon, polygon_area, polygon_centroid, polygon_normal,
    Plane, AABB, PLANE_EPSILON,
};
use super::member::MemberKey;

new_key_type! {
    /// Stable key for an Occluder within a SceneGraph.
    pub struct OccluderKey;
}

bitflags! {
    /// World axes an auto-oriented occluder may rotate about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AutoOrient: u8 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const Z = 1 << 2;
    }
}

/// Hulls below this area never produce an occlusion volume.
const MIN_HULL_AREA: f32 = 1.0e-6;

/// Everything needed to insert an occluder into a `SceneGraph`.
#[derive(Debug, Clone)]
pub struct OccluderDesc {
    /// Local-space convex vertex loop; the face normal follows counter-clockwise winding
    pub hull: Vec<Vec3>,
    pub transform: Mat4,
    pub auto_orient: AutoOrient,
    /// Owning member: sector membership follows the member's sectors.
    /// `None` = standalone, membership computed from the world bounds.
    pub owner: Option<MemberKey>,
}

impl Default for OccluderDesc {
    fn default() -> Self {
        Self {
            hull: Vec::new(),
            transform: Mat4::IDENTITY,
            auto_orient: AutoOrient::empty(),
            owner: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Occluder {
    local_hull: Vec<Vec3>,
    transform: Mat4,
    auto_orient: AutoOrient,
    owner: Option<MemberKey>,
    // Derived from local_hull and transform
    world_hull: Vec<Vec3>,
    world_center: Vec3,
    world_bounds: AABB,
    degenerate: bool,
}

impl Occluder {
    pub(crate) fn new(desc: OccluderDesc) -> Self {
        let mut occluder = Self {
            local_hull: desc.hull,
            transform: desc.transform,
            auto_orient: desc.auto_orient,
            owner: desc.owner,
            world_hull: Vec::new(),
            world_center: Vec3::ZERO,
            world_bounds: AABB::new(Vec3::ZERO, Vec3::ZERO),
            degenerate: true,
        };
        occluder.update_world();
        occluder
    }

    pub(crate) fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.update_world();
    }

    fn update_world(&mut self) {
        self.world_hull.clear();
        self.world_hull
            .extend(self.local_hull.iter().map(|v| self.transform.transform_point3(*v)));
        self.world_center = polygon_centroid(&self.world_hull);
        self.world_bounds = AABB::from_points(&self.world_hull)
            .unwrap_or_else(|| AABB::new(self.world_center, self.world_center));
        self.degenerate = self.world_hull.len() < 3
            || polygon_area(&self.world_hull) < MIN_HULL_AREA
            || polygon_normal(&self.world_hull).is_none();
    }

    // ===== GETTERS =====

    pub fn local_hull(&self) -> &[Vec3] {
        &self.local_hull
    }

    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn auto_orient(&self) -> AutoOrient {
        self.auto_orient
    }

    pub fn owner(&self) -> Option<MemberKey> {
        self.owner
    }

    /// Hull under the world transform, before auto-orientation.
    pub fn world_hull(&self) -> &[Vec3] {
        &self.world_hull
    }

    pub fn world_bounds(&self) -> &AABB {
        &self.world_bounds
    }

    /// Fewer than 3 vertices or (near) zero area.
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Bounds enclosing the hull under any auto-orientation.
    pub fn culling_bounds(&self) -> AABB {
        if self.auto_orient.is_empty() {
            return self.world_bounds;
        }
        let radius = self
            .world_hull
            .iter()
            .map(|v| v.distance(self.world_center))
            .fold(0.0, f32::max);
        AABB::from_sphere(self.world_center, radius)
    }

    // ===== CULLING =====

    /// World-space culling transform for a viewpoint.
    ///
    /// The world transform, preceded by the auto-orient rotation about the
    /// hull center when enabled.
    pub fn culling_transform(&self, viewpoint: Vec3) -> Mat4 {
        match self.orientation_toward(viewpoint) {
            Some(rotation) => {
                let center = self.world_center;
                Mat4::from_translation(center)
                    * Mat4::from_quat(rotation)
                    * Mat4::from_translation(-center)
                    * self.transform
            }
            None => self.transform,
        }
    }

    /// Hull as seen from `viewpoint`, written into `out`.
    pub fn culling_hull(&self, viewpoint: Vec3, out: &mut Vec<Vec3>) {
        out.clear();
        if self.auto_orient.is_empty() {
            out.extend_from_slice(&self.world_hull);
            return;
        }
        let transform = self.culling_transform(viewpoint);
        out.extend(self.local_hull.iter().map(|v| transform.transform_point3(*v)));
    }

    /// Build the occlusion volume seen from `viewpoint` into `planes`.
    ///
    /// Edge planes through the viewpoint followed by the back-facing hull
    /// plane. Returns `false` (and leaves `planes` empty) for degenerate
    /// hulls and when the viewpoint is not in front of the hull.
    pub fn build_frustum(
        &self,
        viewpoint: Vec3,
        hull_scratch: &mut Vec<Vec3>,
        planes: &mut Vec<Plane>,
    ) -> bool {
        planes.clear();
        if self.degenerate {
            return false;
        }
        self.culling_hull(viewpoint, hull_scratch);

        let Some(normal) = polygon_normal(hull_scratch) else {
            return false;
        };
        let face = Plane::from_point_normal(polygon_centroid(hull_scratch), normal);
        if face.distance(viewpoint) <= PLANE_EPSILON {
            return false;
        }
        if frustum_planes_from_polygon(hull_scratch, viewpoint, planes) < 3 {
            planes.clear();
            return false;
        }
        planes.push(face.flipped());
        true
    }

    /// Rotation turning the face normal toward `viewpoint`, about the
    /// allowed axes. `None` when auto-orient is off or nothing needs to turn.
    fn orientation_toward(&self, viewpoint: Vec3) -> Option<Quat> {
        if self.auto_orient.is_empty() || self.degenerate {
            return None;
        }
        let normal = polygon_normal(&self.world_hull)?;
        let to_view = (viewpoint - self.world_center).try_normalize()?;

        let axis = match self.single_axis() {
            Some(axis) => axis,
            None => return Some(Quat::from_rotation_arc(normal, to_view)),
        };

        // Rotate about one axis: compare directions projected onto its plane
        let n = (normal - axis * normal.dot(axis)).try_normalize()?;
        let v = (to_view - axis * to_view.dot(axis)).try_normalize()?;
        let angle = axis.dot(n.cross(v)).atan2(n.dot(v));
        Some(Quat::from_axis_angle(axis, angle))
    }

    fn single_axis(&self) -> Option<Vec3> {
        if self.auto_orient == AutoOrient::X {
            Some(Vec3::X)
        } else if self.auto_orient == AutoOrient::Y {
            Some(Vec3::Y)
        } else if self.auto_orient == AutoOrient::Z {
            Some(Vec3::Z)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "occluder_tests.rs"]
mod tests;
