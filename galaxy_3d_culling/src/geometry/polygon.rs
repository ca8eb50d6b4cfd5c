/// Convex polygon helpers: clipping, normals, and frustum construction.
///
/// Polygons are ordered vertex loops (`&[Vec3]`), implicitly closed.
/// Output buffers are passed in by the caller so the culler can reuse them
/// frame after frame.

use glam::Vec3;
use super::plane::{Plane, PLANE_EPSILON};

/// Clip a convex polygon against one plane (Sutherland–Hodgman).
///
/// Vertices within `epsilon` of the plane are kept; a new vertex is
/// inserted wherever an edge crosses from one side to the other beyond
/// `epsilon`; vertices on the negative side are dropped.
pub fn clip_polygon(input: &[Vec3], plane: &Plane, epsilon: f32, out: &mut Vec<Vec3>) {
    out.clear();
    let count = input.len();
    for i in 0..count {
        let a = input[i];
        let b = input[(i + 1) % count];
        let da = plane.distance(a);
        let db = plane.distance(b);

        if da >= -epsilon {
            out.push(a);
        }
        if (da > epsilon && db < -epsilon) || (da < -epsilon && db > epsilon) {
            let t = da / (da - db);
            out.push(a + (b - a) * t);
        }
    }
}

/// Clip `vertices` in place against every plane.
///
/// Returns `false` as soon as fewer than 3 vertices remain; the polygon is
/// then degenerate and `vertices` holds whatever was left.
pub fn clip_polygon_by_planes(
    vertices: &mut Vec<Vec3>,
    planes: &[Plane],
    scratch: &mut Vec<Vec3>,
) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    for plane in planes {
        clip_polygon(vertices, plane, PLANE_EPSILON, scratch);
        std::mem::swap(vertices, scratch);
        if vertices.len() < 3 {
            return false;
        }
    }
    true
}

/// Unit normal by Newell's method (counter-clockwise winding → normal toward viewer).
///
/// `None` for degenerate (zero-area) polygons.
pub fn polygon_normal(vertices: &[Vec3]) -> Option<Vec3> {
    let sum = newell(vertices);
    if sum.length_squared() < 1.0e-12 {
        return None;
    }
    Some(sum.normalize())
}

pub fn polygon_area(vertices: &[Vec3]) -> f32 {
    newell(vertices).length() * 0.5
}

/// Vertex average; strictly inside any non-degenerate convex polygon.
pub fn polygon_centroid(vertices: &[Vec3]) -> Vec3 {
    if vertices.is_empty() {
        return Vec3::ZERO;
    }
    vertices.iter().copied().sum::<Vec3>() / vertices.len() as f32
}

/// Whether `point`, projected along `normal`, falls inside the polygon.
///
/// The polygon must be wound counter-clockwise around `normal`.
pub fn point_in_convex_polygon(point: Vec3, vertices: &[Vec3], normal: Vec3) -> bool {
    let count = vertices.len();
    if count < 3 {
        return false;
    }
    (0..count).all(|i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % count];
        (b - a).cross(point - a).dot(normal) >= -PLANE_EPSILON
    })
}

/// Append one plane per polygon edge, each passing through the edge and
/// `viewpoint`, oriented so the polygon interior is on the positive side.
///
/// The resulting volume is the pyramid from the viewpoint through the
/// polygon. Edges collinear with the viewpoint produce no plane. Returns
/// the number of planes appended.
pub fn frustum_planes_from_polygon(
    polygon: &[Vec3],
    viewpoint: Vec3,
    out: &mut Vec<Plane>,
) -> usize {
    let count = polygon.len();
    if count < 3 {
        return 0;
    }
    let centroid = polygon_centroid(polygon);
    let before = out.len();

    for i in 0..count {
        let a = polygon[i];
        let b = polygon[(i + 1) % count];
        let normal = (b - a).cross(viewpoint - a);
        if normal.length_squared() < 1.0e-12 {
            continue;
        }
        let mut plane = Plane::from_point_normal(viewpoint, normal);
        let side = plane.distance(centroid);
        if side.abs() < 1.0e-6 {
            continue;
        }
        if side < 0.0 {
            plane = plane.flipped();
        }
        out.push(plane);
    }

    out.len() - before
}

fn newell(vertices: &[Vec3]) -> Vec3 {
    let count = vertices.len();
    let mut sum = Vec3::ZERO;
    for i in 0..count {
        let a = vertices[i];
        let b = vertices[(i + 1) % count];
        sum.x += (a.y - b.y) * (a.z + b.z);
        sum.y += (a.z - b.z) * (a.x + b.x);
        sum.z += (a.x - b.x) * (a.y + b.y);
    }
    sum
}

#[cfg(test)]
#[path = "polygon_tests.rs"]
mod tests;
