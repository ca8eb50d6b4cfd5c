/// VisibleSet: the result of a cull.
///
/// Three handle → child mappings (renderables, lights, terrain patches)
/// plus the shadow-casting lights discovered among the visible lights.
/// Admission is idempotent, so work items may run in any order and on any
/// thread; only set equality matters.
///
/// `SharedVisibleSet` is the cross-thread accumulator: workers fill a
/// private scratch set and merge it under one lock per category.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use crate::scene::{ChildKind, ChildRef, MemberChild, ObjectHandle, ObjectKind};

pub type HandleMap = FxHashMap<ObjectHandle, ChildRef>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    renderables: HandleMap,
    lights: HandleMap,
    terrains: HandleMap,
    shadow_lights: HandleMap,
}

impl VisibleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a child visible. Visible lights with shadows enabled are also
    /// recorded as shadow lights.
    pub fn admit_child(&mut self, child_ref: ChildRef, child: &MemberChild) {
        match &child.kind {
            ChildKind::Renderable => {
                self.renderables.insert(child.handle, child_ref);
            }
            ChildKind::Terrain => {
                self.terrains.insert(child.handle, child_ref);
            }
            ChildKind::Light(info) => {
                self.lights.insert(child.handle, child_ref);
                if info.shadows {
                    self.shadow_lights.insert(child.handle, child_ref);
                }
            }
        }
    }

    pub fn contains(&self, kind: ObjectKind, handle: ObjectHandle) -> bool {
        self.map(kind).contains_key(&handle)
    }

    pub fn map(&self, kind: ObjectKind) -> &HandleMap {
        match kind {
            ObjectKind::Renderable => &self.renderables,
            ObjectKind::Light => &self.lights,
            ObjectKind::Terrain => &self.terrains,
        }
    }

    pub fn renderables(&self) -> &HandleMap {
        &self.renderables
    }

    pub fn lights(&self) -> &HandleMap {
        &self.lights
    }

    pub fn terrains(&self) -> &HandleMap {
        &self.terrains
    }

    /// Visible lights that cast shadows.
    pub fn shadow_lights(&self) -> &HandleMap {
        &self.shadow_lights
    }

    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn terrain_count(&self) -> usize {
        self.terrains.len()
    }

    /// Renderables + lights + terrain patches.
    pub fn len(&self) -> usize {
        self.renderables.len() + self.lights.len() + self.terrains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Handles of one category in ascending order.
    pub fn sorted_handles(&self, kind: ObjectKind) -> Vec<ObjectHandle> {
        let mut handles: Vec<ObjectHandle> = self.map(kind).keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Union with another set.
    pub fn merge_from(&mut self, other: &VisibleSet) {
        self.renderables.extend(other.renderables.iter().map(|(h, c)| (*h, *c)));
        self.lights.extend(other.lights.iter().map(|(h, c)| (*h, *c)));
        self.terrains.extend(other.terrains.iter().map(|(h, c)| (*h, *c)));
        self.shadow_lights.extend(other.shadow_lights.iter().map(|(h, c)| (*h, *c)));
    }

    /// Empty every category, keeping capacity.
    pub fn clear(&mut self) {
        self.renderables.clear();
        self.lights.clear();
        self.terrains.clear();
        self.shadow_lights.clear();
    }
}

/// Visible-set shared between worker threads, one lock per category.
#[derive(Debug, Default)]
pub(crate) struct SharedVisibleSet {
    renderables: Mutex<HandleMap>,
    lights: Mutex<HandleMap>,
    terrains: Mutex<HandleMap>,
    shadow_lights: Mutex<HandleMap>,
}

impl SharedVisibleSet {
    /// Move a worker's scratch set in, leaving it empty.
    pub(crate) fn merge(&self, scratch: &mut VisibleSet) {
        drain_locked(&self.renderables, &mut scratch.renderables);
        drain_locked(&self.lights, &mut scratch.lights);
        drain_locked(&self.terrains, &mut scratch.terrains);
        drain_locked(&self.shadow_lights, &mut scratch.shadow_lights);
    }

    /// Move everything accumulated so far into `out`.
    pub(crate) fn take_into(&self, out: &mut VisibleSet) {
        out.renderables.extend(self.renderables.lock().drain());
        out.lights.extend(self.lights.lock().drain());
        out.terrains.extend(self.terrains.lock().drain());
        out.shadow_lights.extend(self.shadow_lights.lock().drain());
    }
}

fn drain_locked(shared: &Mutex<HandleMap>, scratch: &mut HandleMap) {
    if scratch.is_empty() {
        return;
    }
    shared.lock().extend(scratch.drain());
}

#[cfg(test)]
#[path = "visible_set_tests.rs"]
mod tests;
