/// Occluder accumulation along a traversal branch.
///
/// Each traversal node carries the occluder frustums activated by its
/// ancestors. Sets are immutable and shared (`Arc`); adding occluders for a
/// sector's descendants produces a new set, so sibling branches never see
/// each other's occluders. Work items snapshot a set by cloning the `Arc`.

use std::sync::Arc;
use crate::geometry::{contains_aabb, Plane, AABB};
use crate::scene::OccluderKey;

/// Convex volume hidden behind one occluder, as seen from the viewpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OccluderFrustum {
    key: OccluderKey,
    planes: Vec<Plane>,
}

impl OccluderFrustum {
    pub fn new(key: OccluderKey, planes: Vec<Plane>) -> Self {
        Self { key, planes }
    }

    pub fn key(&self) -> OccluderKey {
        self.key
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Bounds fully inside the hidden volume.
    pub fn hides(&self, bounds: &AABB) -> bool {
        contains_aabb(&self.planes, bounds)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OccluderSet {
    frustums: Arc<Vec<OccluderFrustum>>,
}

impl OccluderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.frustums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frustums.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OccluderFrustum> {
        self.frustums.iter()
    }

    /// Whether this occluder is already active on the branch.
    pub fn contains_key(&self, key: OccluderKey) -> bool {
        self.frustums.iter().any(|f| f.key == key)
    }

    /// Whether any active occluder fully hides `bounds`.
    pub fn occludes(&self, bounds: &AABB) -> bool {
        self.frustums.iter().any(|f| f.hides(bounds))
    }

    /// Whether every occluder of this set is also active in `other`.
    pub fn is_subset_of(&self, other: &OccluderSet) -> bool {
        Arc::ptr_eq(&self.frustums, &other.frustums)
            || self.frustums.iter().all(|f| other.contains_key(f.key))
    }

    /// This set plus `added`. Shares the existing allocation when nothing
    /// is added.
    pub fn extended(&self, added: Vec<OccluderFrustum>) -> OccluderSet {
        if added.is_empty() {
            return self.clone();
        }
        let mut frustums = Vec::with_capacity(self.frustums.len() + added.len());
        frustums.extend(self.frustums.iter().cloned());
        frustums.extend(added);
        OccluderSet { frustums: Arc::new(frustums) }
    }
}

#[cfg(test)]
#[path = "occluder_set_tests.rs"]
mod tests;
