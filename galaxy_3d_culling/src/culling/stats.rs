/// Per-frame culling statistics and optional debug geometry.

use glam::Vec3;

/// Counters for one cull.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CullStats {
    pub visible_renderables: usize,
    pub visible_lights: usize,
    pub visible_terrains: usize,
    pub culled_renderables: usize,
    pub culled_lights: usize,
    pub culled_terrains: usize,
    /// Visible lights with shadows enabled
    pub shadow_lights: usize,
    /// Objects admitted by the shadow post-pass only
    pub shadow_casters_admitted: usize,
    /// Traversal nodes processed (a sector reached by two paths counts twice)
    pub visited_sectors: usize,
    /// Nodes dropped because an earlier visit of the sector covered them
    pub revisits_skipped: usize,
    /// Leaf and shadow work items dispatched
    pub work_items: usize,
    pub portals_traversed: usize,
    pub portals_rejected: usize,
    /// Occluder frustums built during the walk
    pub occluders_activated: usize,
    /// At least one branch stopped at `max_portal_depth`
    pub depth_limited: bool,
    /// The walk stopped at `max_traversal_nodes` with nodes still pending
    pub traversal_limited: bool,
    /// Simple (portal-less) culling was used
    pub simple_mode: bool,
}

/// Geometry recorded when `collect_debug_geometry` is enabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugGeometry {
    /// Portal polygons after clipping against the incoming frustum
    pub portal_polygons: Vec<Vec<Vec3>>,
    /// Occluder hulls as used for culling (after auto-orientation)
    pub occluder_hulls: Vec<Vec<Vec3>>,
}

impl DebugGeometry {
    pub fn clear(&mut self) {
        self.portal_polygons.clear();
        self.occluder_hulls.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.portal_polygons.is_empty() && self.occluder_hulls.is_empty()
    }
}
