/// VisibilityApplier: diff a visible-set against the hidden bookkeeping.
///
/// Each apply walks every child in the scene:
/// - visible and previously hidden: shown, dropped from the hidden set
/// - visible and not hidden: untouched
/// - not visible and previously hidden: stays hidden, no call
/// - not visible and not hidden: hidden
///
/// The hidden set is rebuilt from the scene on every apply, so objects
/// removed from the scene since the last frame are forgotten.

use rustc_hash::FxHashSet;
use crate::culling::VisibleSet;
use crate::engine_trace;
use crate::scene::{ObjectHandle, ObjectKind, SceneGraph};
use super::sink::VisibilitySink;

const SOURCE: &str = "galaxy3d::VisibilityApplier";

/// When hidden objects are restored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyMode {
    /// Several cameras cull per frame: `end_frame` shows everything again
    Immediate,
    /// One camera: hidden state persists until the next apply
    Persist,
}

/// Sink calls issued by one apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Previously hidden objects now shown
    pub shown: usize,
    /// Newly hidden objects
    pub hidden: usize,
    /// Objects left hidden without a call
    pub still_hidden: usize,
}

pub struct VisibilityApplier {
    mode: ApplyMode,
    hidden: FxHashSet<(ObjectKind, ObjectHandle)>,
    scratch: FxHashSet<(ObjectKind, ObjectHandle)>,
}

impl VisibilityApplier {
    pub fn new(mode: ApplyMode) -> Self {
        Self {
            mode,
            hidden: FxHashSet::default(),
            scratch: FxHashSet::default(),
        }
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ApplyMode) {
        self.mode = mode;
    }

    /// Objects currently hidden by this applier.
    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }

    pub fn is_hidden(&self, kind: ObjectKind, handle: ObjectHandle) -> bool {
        self.hidden.contains(&(kind, handle))
    }

    /// Bring the host's objects in line with `visible`.
    pub fn apply(
        &mut self,
        scene: &SceneGraph,
        visible: &VisibleSet,
        sink: &mut dyn VisibilitySink,
    ) -> ApplyStats {
        let mut stats = ApplyStats::default();
        self.scratch.clear();

        for (_, member) in scene.members() {
            for child in member.children() {
                let key = (child.object_kind(), child.handle);
                let was_hidden = self.hidden.contains(&key);
                if visible.contains(key.0, key.1) {
                    if was_hidden {
                        set_visible(sink, key, true);
                        stats.shown += 1;
                    }
                } else if self.scratch.insert(key) {
                    if was_hidden {
                        stats.still_hidden += 1;
                    } else {
                        set_visible(sink, key, false);
                        stats.hidden += 1;
                    }
                }
            }
        }

        std::mem::swap(&mut self.hidden, &mut self.scratch);
        engine_trace!(
            SOURCE,
            "Applied visibility: {} shown, {} hidden, {} still hidden",
            stats.shown,
            stats.hidden,
            stats.still_hidden
        );
        stats
    }

    /// End of a multi-camera frame: restore everything in `Immediate`
    /// mode. Returns the number of objects shown again.
    pub fn end_frame(&mut self, sink: &mut dyn VisibilitySink) -> usize {
        match self.mode {
            ApplyMode::Immediate => self.revert(sink),
            ApplyMode::Persist => 0,
        }
    }

    /// Show every object this applier has hidden.
    pub fn revert(&mut self, sink: &mut dyn VisibilitySink) -> usize {
        let count = self.hidden.len();
        for key in self.hidden.drain() {
            set_visible(sink, key, true);
        }
        count
    }
}

fn set_visible(sink: &mut dyn VisibilitySink, (kind, handle): (ObjectKind, ObjectHandle), visible: bool) {
    match kind {
        ObjectKind::Renderable => sink.set_renderable_visible(handle, visible),
        ObjectKind::Light => sink.set_light_visible(handle, visible),
        ObjectKind::Terrain => sink.set_terrain_detail(handle, visible),
    }
}

#[cfg(test)]
#[path = "applier_tests.rs"]
mod tests;
