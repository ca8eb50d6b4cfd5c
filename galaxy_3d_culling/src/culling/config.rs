/// Culling configuration.
///
/// Plain data with public fields. The culler sanitizes it once through
/// `clamped()` whenever a configuration is installed.

use crate::engine_warn;
use crate::visibility::ApplyMode;

/// Portal hops after which the graph walk stops expanding a branch.
pub const DEFAULT_MAX_PORTAL_DEPTH: usize = 64;

/// Sector visits after which the graph walk stops altogether.
pub const DEFAULT_MAX_TRAVERSAL_NODES: usize = 16384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CullingConfig {
    /// Several cameras cull per frame: hidden objects are restored at end of frame
    pub multi_camera_culling: bool,
    /// Skip the portal walk and test every sector against the raw frustum
    pub simple_culling: bool,
    /// Run the shadow-caster post-pass
    pub cull_shadows: bool,
    /// Worker threads for leaf and shadow work (0 = serial on the calling thread)
    pub worker_thread_count: usize,
    /// Maximum portal hops from the viewpoint's sector
    pub max_portal_depth: usize,
    /// Maximum sector visits per cull
    pub max_traversal_nodes: usize,
    /// Record clipped portal polygons and occluder hulls each frame
    pub collect_debug_geometry: bool,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            multi_camera_culling: true,
            simple_culling: false,
            cull_shadows: true,
            worker_thread_count: 0,
            max_portal_depth: DEFAULT_MAX_PORTAL_DEPTH,
            max_traversal_nodes: DEFAULT_MAX_TRAVERSAL_NODES,
            collect_debug_geometry: false,
        }
    }
}

impl CullingConfig {
    /// Copy with out-of-range values clamped (and a warning logged for each).
    ///
    /// - `worker_thread_count` ≤ available hardware threads
    /// - `max_portal_depth` ≥ 1
    /// - `max_traversal_nodes` ≥ 1
    pub fn clamped(&self) -> Self {
        let mut config = self.clone();

        let hardware = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        if config.worker_thread_count > hardware {
            engine_warn!(
                "galaxy3d::CullingConfig",
                "worker_thread_count {} exceeds {} hardware threads, clamped",
                config.worker_thread_count,
                hardware
            );
            config.worker_thread_count = hardware;
        }

        if config.max_portal_depth == 0 {
            engine_warn!("galaxy3d::CullingConfig", "max_portal_depth 0 clamped to 1");
            config.max_portal_depth = 1;
        }

        if config.max_traversal_nodes == 0 {
            engine_warn!("galaxy3d::CullingConfig", "max_traversal_nodes 0 clamped to 1");
            config.max_traversal_nodes = 1;
        }

        config
    }

    /// How visibility changes are applied for this configuration.
    pub fn apply_mode(&self) -> ApplyMode {
        if self.multi_camera_culling {
            ApplyMode::Immediate
        } else {
            ApplyMode::Persist
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
