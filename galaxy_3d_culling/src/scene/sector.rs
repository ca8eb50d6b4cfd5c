/// Sector: a bounded region of the scene, the unit of culling partition.
///
/// Sectors are connected through portals. Each sector knows the portals on
/// its boundary and the members overlapping it; both lists are maintained
/// by the `SceneGraph`. Sectors are read-only during culling.

use slotmap::new_key_type;
use crate::geometry::AABB;
use super::member::MemberKey;
use super::portal::PortalKey;

new_key_type! {
    /// Stable key for a Sector within a SceneGraph.
    pub struct SectorKey;
}

#[derive(Debug, Clone)]
pub struct Sector {
    bounds: AABB,
    contiguous_terrain: bool,
    pub(crate) portals: Vec<PortalKey>,
    pub(crate) members: Vec<MemberKey>,
}

impl Sector {
    pub(crate) fn new(bounds: AABB, contiguous_terrain: bool) -> Self {
        Self {
            bounds,
            contiguous_terrain,
            portals: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Region covered by this sector.
    pub fn bounds(&self) -> &AABB {
        &self.bounds
    }

    /// Part of a contiguous terrain: a viewpoint inside such sectors only
    /// triggers simple (portal-less) culling.
    pub fn is_contiguous_terrain(&self) -> bool {
        self.contiguous_terrain
    }

    pub fn portals(&self) -> &[PortalKey] {
        &self.portals
    }

    pub fn members(&self) -> &[MemberKey] {
        &self.members
    }
}
