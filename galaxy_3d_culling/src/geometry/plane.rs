/// Plane: an oriented half-space boundary.
///
/// Stored as (normal, d) with `normal · p + d = 0` on the plane.
/// The normal points toward the positive ("inside") half-space: a point P
/// is inside when `distance(P) >= 0`. Every convex volume in the crate
/// (view frustums, portal frustums, occluder frustums) is an ordered list
/// of such planes.

use glam::{Vec3, Vec4};

/// Tolerance used by side classification and polygon clipping.
pub const PLANE_EPSILON: f32 = 1.0e-3;

/// Result of classifying a point against a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneSide {
    /// Strictly on the positive side (beyond epsilon)
    Front,
    /// Strictly on the negative side (beyond epsilon)
    Back,
    /// Within epsilon of the plane
    On,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal, pointing into the positive half-space
    pub normal: Vec3,
    /// Signed offset: `normal · p + d = 0` on the plane
    pub d: f32,
}

impl Plane {
    /// Build a plane from a normal and offset. The normal is normalized.
    pub fn new(normal: Vec3, d: f32) -> Self {
        let len = normal.length();
        if len > 0.0 {
            Self { normal: normal / len, d: d / len }
        } else {
            Self { normal, d }
        }
    }

    /// Plane through `point` with the given normal (normalized here).
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize_or_zero();
        Self { normal, d: -normal.dot(point) }
    }

    /// Plane through three points, normal following counter-clockwise winding.
    ///
    /// Returns `None` for collinear points.
    pub fn from_points(a: Vec3, b: Vec3, c: Vec3) -> Option<Self> {
        let normal = (b - a).cross(c - a);
        if normal.length_squared() < 1.0e-12 {
            return None;
        }
        Some(Self::from_point_normal(a, normal))
    }

    /// Build from a packed (A, B, C, D) vector.
    pub fn from_vec4(v: Vec4) -> Self {
        Self::new(v.truncate(), v.w)
    }

    /// Pack as (A, B, C, D).
    pub fn to_vec4(&self) -> Vec4 {
        self.normal.extend(self.d)
    }

    /// Signed distance from the plane (positive = inside).
    #[inline]
    pub fn distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Classify a point with the given tolerance.
    #[inline]
    pub fn side(&self, point: Vec3, epsilon: f32) -> PlaneSide {
        let dist = self.distance(point);
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }

    /// Same plane, opposite orientation.
    pub fn flipped(&self) -> Self {
        Self { normal: -self.normal, d: -self.d }
    }

    /// A point on the line where this plane meets `other`.
    ///
    /// Returns `None` when the planes are (nearly) parallel.
    pub fn intersection_point(&self, other: &Plane) -> Option<Vec3> {
        let dir = self.normal.cross(other.normal);
        let denom = dir.length_squared();
        if denom < 1.0e-10 {
            return None;
        }
        // Planes written as n·x = h
        let h1 = -self.d;
        let h2 = -other.d;
        Some((other.normal.cross(dir) * h1 + dir.cross(self.normal) * h2) / denom)
    }

    /// Bevel plane between this plane and `other`.
    ///
    /// Normal is the normalized sum of both normals and the plane passes
    /// through their intersection line, so the intersection of the two
    /// half-spaces lies entirely inside the bevel half-space.
    pub fn bevel(&self, other: &Plane) -> Option<Plane> {
        let point = self.intersection_point(other)?;
        let sum = self.normal + other.normal;
        if sum.length_squared() < 1.0e-10 {
            return None;
        }
        Some(Plane::from_point_normal(point, sum))
    }
}

#[cfg(test)]
#[path = "plane_tests.rs"]
mod tests;
