/// Portal: a planar convex aperture between two sectors.
///
/// The vertex loop is wound counter-clockwise when seen from the front
/// sector, so the plane normal points into the front sector and the front
/// sector lies on the plane's positive side. Either sector may be absent
/// (a portal on the edge of the world leads nowhere).
///
/// A `PASS_THROUGH` portal may also be a bare link between two sectors:
/// fewer than 3 vertices or no area. Such a link has no plane and is
/// crossed without any geometric test.

use bitflags::bitflags;
use glam::Vec3;
use slotmap::new_key_type;
use crate::geometry::{polygon_area, polygon_centroid, polygon_normal, Plane, AABB};
use super::sector::SectorKey;

new_key_type! {
    /// Stable key for a Portal within a SceneGraph.
    pub struct PortalKey;
}

bitflags! {
    /// Traversal flags of a portal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PortalFlags: u32 {
        /// Blocks traversal entirely
        const CLOSED = 1 << 0;
        /// Traversed without clipping: the incoming frustum is forwarded verbatim
        const PASS_THROUGH = 1 << 1;
    }
}

/// Minimum polygon area for a portal to be accepted.
const MIN_PORTAL_AREA: f32 = 1.0e-6;

/// Everything needed to insert a portal into a `SceneGraph`.
#[derive(Debug, Clone, Default)]
pub struct PortalDesc {
    /// World-space vertex loop, counter-clockwise seen from `front`
    pub vertices: Vec<Vec3>,
    pub front: Option<SectorKey>,
    pub back: Option<SectorKey>,
    pub flags: PortalFlags,
}

/// Plane, center and bounds of a non-degenerate vertex loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalShape {
    /// Normal pointing into the front sector
    pub plane: Plane,
    pub center: Vec3,
    pub bounds: AABB,
}

impl PortalShape {
    /// `None` for fewer than 3 vertices or a (near) zero-area loop.
    fn from_vertices(vertices: &[Vec3]) -> Option<Self> {
        if vertices.len() < 3 || polygon_area(vertices) < MIN_PORTAL_AREA {
            return None;
        }
        let normal = polygon_normal(vertices)?;
        let bounds = AABB::from_points(vertices)?;
        let center = polygon_centroid(vertices);
        Some(Self { plane: Plane::from_point_normal(center, normal), center, bounds })
    }
}

#[derive(Debug, Clone)]
pub struct Portal {
    vertices: Vec<Vec3>,
    front: Option<SectorKey>,
    back: Option<SectorKey>,
    shape: Option<PortalShape>,
    flags: PortalFlags,
}

impl Portal {
    /// Build a portal and precompute its plane, center and bounds.
    ///
    /// Returns `None` for a degenerate loop, unless the portal is
    /// `PASS_THROUGH`, in which case it becomes a link without shape.
    pub(crate) fn from_desc(desc: PortalDesc) -> Option<Self> {
        let shape = PortalShape::from_vertices(&desc.vertices);
        if shape.is_none() && !desc.flags.contains(PortalFlags::PASS_THROUGH) {
            return None;
        }
        Some(Self {
            shape,
            vertices: desc.vertices,
            front: desc.front,
            back: desc.back,
            flags: desc.flags,
        })
    }

    /// Sector reached by crossing this portal from `from`, and whether that
    /// crossing goes front → back.
    ///
    /// `None` if `from` is not one of the portal's sectors or the other side
    /// is absent.
    pub fn traverse_from(&self, from: SectorKey) -> Option<(SectorKey, bool)> {
        if self.front == Some(from) {
            self.back.map(|back| (back, true))
        } else if self.back == Some(from) {
            self.front.map(|front| (front, false))
        } else {
            None
        }
    }

    // ===== GETTERS =====

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn front(&self) -> Option<SectorKey> {
        self.front
    }

    pub fn back(&self) -> Option<SectorKey> {
        self.back
    }

    /// Plane, center and bounds; `None` for a shapeless pass-through link.
    pub fn shape(&self) -> Option<&PortalShape> {
        self.shape.as_ref()
    }

    /// Portal plane, normal pointing into the front sector.
    pub fn plane(&self) -> Option<&Plane> {
        self.shape.as_ref().map(|s| &s.plane)
    }

    pub fn center(&self) -> Option<Vec3> {
        self.shape.map(|s| s.center)
    }

    pub fn bounds(&self) -> Option<&AABB> {
        self.shape.as_ref().map(|s| &s.bounds)
    }

    /// Whether this portal is a link without geometry.
    pub fn is_link(&self) -> bool {
        self.shape.is_none()
    }

    pub fn flags(&self) -> PortalFlags {
        self.flags
    }

    pub fn is_closed(&self) -> bool {
        self.flags.contains(PortalFlags::CLOSED)
    }

    pub fn is_pass_through(&self) -> bool {
        self.flags.contains(PortalFlags::PASS_THROUGH)
    }

    /// Replace the flags. A shapeless link must stay `PASS_THROUGH`:
    /// returns `false` and leaves the flags unchanged otherwise.
    pub(crate) fn set_flags(&mut self, flags: PortalFlags) -> bool {
        if self.shape.is_none() && !flags.contains(PortalFlags::PASS_THROUGH) {
            return false;
        }
        self.flags = flags;
        true
    }

    pub(crate) fn detach_sector(&mut self, sector: SectorKey) {
        if self.front == Some(sector) {
            self.front = None;
        }
        if self.back == Some(sector) {
            self.back = None;
        }
    }
}

#[cfg(test)]
#[path = "portal_tests.rs"]
mod tests;
