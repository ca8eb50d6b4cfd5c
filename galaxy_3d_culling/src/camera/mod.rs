//! Camera module: view frustum, cull view, and culling camera.
//!
//! `Frustum` and `CullView` are passive data containers describing where a
//! cull is performed from. `CullingCamera` ties a view to a culler and a
//! visibility applier; it is owned and driven by the caller.

mod frustum;
mod cull_view;
mod culling_camera;

pub use frustum::{
    Frustum,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use cull_view::CullView;
pub use culling_camera::CullingCamera;
