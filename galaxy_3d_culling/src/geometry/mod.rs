//! Geometry module: planes, bounding boxes and convex polygons.
//!
//! Pure functions and plain data, no state. Everything the culler needs to
//! clip portals, build frustums from polygons and test bounds against
//! convex plane sets lives here.

mod aabb;
mod convex;
mod plane;
mod polygon;

pub use aabb::AABB;
pub use convex::{
    FrustumTest, bevel_planes, classify_aabb, contains_aabb, contains_point, intersects_aabb,
    BEVEL_DOT_MAX, BEVEL_DOT_MIN,
};
pub use plane::{Plane, PlaneSide, PLANE_EPSILON};
pub use polygon::{
    clip_polygon, clip_polygon_by_planes, frustum_planes_from_polygon,
    point_in_convex_polygon, polygon_area, polygon_centroid, polygon_normal,
};
