/// Convex volumes as plane lists.
///
/// A convex volume is the intersection of the positive half-spaces of an
/// ordered list of planes. View frustums, portal-clipped frustums and
/// occluder frustums all go through these tests.

use glam::Vec3;
use super::aabb::AABB;
use super::plane::Plane;

/// Lower bound (exclusive) of the normal dot product that triggers a bevel.
pub const BEVEL_DOT_MIN: f32 = -0.99;
/// Upper bound (exclusive) of the normal dot product that triggers a bevel.
pub const BEVEL_DOT_MAX: f32 = -0.9;

/// Result of a 3-way volume/AABB classification.
///
/// - `Outside` → reject
/// - `Inside` → fully contained (occluder rejection uses this)
/// - `Partial` → straddles at least one plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// AABB is entirely outside the volume
    Outside,
    /// AABB is entirely inside the volume
    Inside,
    /// AABB partially overlaps the volume
    Partial,
}

#[inline]
fn positive_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
    Vec3::new(
        if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
        if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
        if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
    )
}

#[inline]
fn negative_vertex(normal: Vec3, aabb: &AABB) -> Vec3 {
    Vec3::new(
        if normal.x >= 0.0 { aabb.min.x } else { aabb.max.x },
        if normal.y >= 0.0 { aabb.min.y } else { aabb.max.y },
        if normal.z >= 0.0 { aabb.min.z } else { aabb.max.z },
    )
}

/// Test if an AABB intersects the volume ("positive vertex" test).
///
/// Conservative: may return false positives near edges, never false negatives.
/// An empty plane list is unbounded and intersects everything.
pub fn intersects_aabb(planes: &[Plane], aabb: &AABB) -> bool {
    planes
        .iter()
        .all(|plane| plane.distance(positive_vertex(plane.normal, aabb)) >= 0.0)
}

/// Test if an AABB is entirely inside the volume.
///
/// An empty plane list never contains anything (an occluder without planes
/// must not hide content).
pub fn contains_aabb(planes: &[Plane], aabb: &AABB) -> bool {
    !planes.is_empty()
        && planes
            .iter()
            .all(|plane| plane.distance(negative_vertex(plane.normal, aabb)) >= 0.0)
}

/// Classify an AABB against the volume (3-way test).
pub fn classify_aabb(planes: &[Plane], aabb: &AABB) -> FrustumTest {
    let mut all_inside = true;

    for plane in planes {
        if plane.distance(positive_vertex(plane.normal, aabb)) < 0.0 {
            return FrustumTest::Outside;
        }
        if plane.distance(negative_vertex(plane.normal, aabb)) < 0.0 {
            all_inside = false;
        }
    }

    if all_inside { FrustumTest::Inside } else { FrustumTest::Partial }
}

pub fn contains_point(planes: &[Plane], point: Vec3) -> bool {
    planes.iter().all(|plane| plane.distance(point) >= 0.0)
}

/// Copy `input` into `out`, inserting a bevel plane after every adjacent
/// pair (including last → first) whose normals are nearly opposed.
///
/// The bevel does not change the enclosed volume; it only tightens the
/// positive-vertex AABB test at narrow reflex angles.
pub fn bevel_planes(input: &[Plane], out: &mut Vec<Plane>) {
    out.clear();
    let count = input.len();
    for i in 0..count {
        let current = input[i];
        out.push(current);
        if count < 2 {
            continue;
        }
        let next = input[(i + 1) % count];
        let dot = current.normal.dot(next.normal);
        if dot > BEVEL_DOT_MIN && dot < BEVEL_DOT_MAX {
            if let Some(bevel) = current.bevel(&next) {
                out.push(bevel);
            }
        }
    }
}

#[cfg(test)]
#[path = "convex_tests.rs"]
mod tests;
