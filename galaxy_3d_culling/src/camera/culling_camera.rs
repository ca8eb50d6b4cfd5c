/// CullingCamera: one camera's culler, applier and culling source.
///
/// Owns a `SectorCuller` and a `VisibilityApplier` configured from the
/// same `CullingConfig`. A culling source, when set, replaces the view
/// passed to `cull` (e.g. to freeze culling at a debug position while the
/// rendered view moves on).

use std::sync::Arc;
use crate::culling::{CullStats, CullingConfig, SectorCuller, VisibleSet};
use crate::scene::SceneGraph;
use crate::visibility::{ApplyStats, VisibilityApplier, VisibilitySink};
use super::cull_view::CullView;

pub struct CullingCamera {
    culler: SectorCuller,
    applier: VisibilityApplier,
    culling_source: Option<CullView>,
}

impl CullingCamera {
    pub fn new(config: CullingConfig) -> Self {
        let applier = VisibilityApplier::new(config.apply_mode());
        Self {
            culler: SectorCuller::new(config),
            applier,
            culling_source: None,
        }
    }

    /// Reconfigure the culler and switch the applier's mode accordingly.
    pub fn set_config(&mut self, config: CullingConfig) {
        self.applier.set_mode(config.apply_mode());
        self.culler.set_config(config);
    }

    // ===== CULLING SOURCE =====

    /// Cull from `source` instead of the view passed to `cull`.
    pub fn set_culling_source(&mut self, source: Option<CullView>) {
        self.culling_source = source;
    }

    pub fn culling_source(&self) -> Option<&CullView> {
        self.culling_source.as_ref()
    }

    // ===== CULLING =====

    /// Compute the visible-set from the culling source, or from `view`.
    pub fn cull(&mut self, scene: &Arc<SceneGraph>, view: &CullView) -> &VisibleSet {
        let view = self.culling_source.as_ref().unwrap_or(view);
        self.culler.cull(scene, view)
    }

    /// Cull, then apply the result to the host's objects.
    pub fn cull_and_apply(
        &mut self,
        scene: &Arc<SceneGraph>,
        view: &CullView,
        sink: &mut dyn VisibilitySink,
    ) -> ApplyStats {
        let view = self.culling_source.as_ref().unwrap_or(view);
        let visible = self.culler.cull(scene, view);
        self.applier.apply(scene, visible, sink)
    }

    /// Close the frame; restores hidden objects in multi-camera mode.
    pub fn end_frame(&mut self, sink: &mut dyn VisibilitySink) -> usize {
        self.applier.end_frame(sink)
    }

    // ===== GETTERS =====

    pub fn culler(&self) -> &SectorCuller {
        &self.culler
    }

    pub fn applier(&self) -> &VisibilityApplier {
        &self.applier
    }

    pub fn visible_set(&self) -> &VisibleSet {
        self.culler.visible_set()
    }

    pub fn stats(&self) -> &CullStats {
        self.culler.stats()
    }
}

#[cfg(test)]
#[path = "culling_camera_tests.rs"]
mod tests;
