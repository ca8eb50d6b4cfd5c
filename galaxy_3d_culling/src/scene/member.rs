/// Member: attachment of renderables, lights and terrain patches to sectors.
///
/// A member groups children that move and cull together. It keeps two
/// aggregate bounds (renderables + terrain patches, and lights) which
/// always contain every child's bounds; they are recomputed whenever the
/// children change.
///
/// The sectors a member overlaps are owned by the `SceneGraph`, which
/// notifies `MemberObserver`s whenever they change.

use glam::Vec3;
use slotmap::new_key_type;
use crate::geometry::AABB;
use super::occluder::OccluderKey;
use super::sector::SectorKey;

new_key_type! {
    /// Stable key for a Member within a SceneGraph.
    pub struct MemberKey;
}

/// Stable integer handle identifying a host object (renderable, light or terrain patch).
///
/// Chosen by the host; the culler only uses it as a set key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(pub u32);

/// The three object categories tracked by visible-sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Renderable,
    Light,
    Terrain,
}

/// How the culler tests a member's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullGranularity {
    /// Aggregate bounds only: all children pass or fail together
    #[default]
    Group,
    /// Aggregate bounds first, then each child's own bounds
    Individual,
}

// ===== LIGHTS =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightType {
    Point,
    /// Cone along `direction` with full opening `angle` (radians)
    Spot { direction: Vec3, angle: f32 },
}

/// Light parameters needed for visibility and shadow-caster culling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightInfo {
    pub position: Vec3,
    pub light_type: LightType,
    pub range: f32,
    /// Distance beyond which the light casts no shadow
    pub shadow_distance: f32,
    /// Bit `n` set = children on layer `n` are lit (and cast shadows for this light)
    pub culling_mask: u32,
    pub shadows: bool,
}

impl LightInfo {
    /// Point light lighting every layer, without shadows.
    pub fn point(position: Vec3, range: f32) -> Self {
        Self {
            position,
            light_type: LightType::Point,
            range,
            shadow_distance: f32::INFINITY,
            culling_mask: u32::MAX,
            shadows: false,
        }
    }

    /// Spot light lighting every layer, without shadows.
    pub fn spot(position: Vec3, direction: Vec3, angle: f32, range: f32) -> Self {
        Self {
            light_type: LightType::Spot {
                direction: direction.normalize_or_zero(),
                angle,
            },
            ..Self::point(position, range)
        }
    }

    /// Enable shadows up to `shadow_distance`.
    pub fn with_shadows(mut self, shadow_distance: f32) -> Self {
        self.shadows = true;
        self.shadow_distance = shadow_distance;
        self
    }

    pub fn with_culling_mask(mut self, mask: u32) -> Self {
        self.culling_mask = mask;
        self
    }

    /// Bounds of the lit volume.
    pub fn bounds(&self) -> AABB {
        self.volume_bounds(self.range)
    }

    /// How far shadows reach: `min(range, shadow_distance)`.
    pub fn shadow_reach(&self) -> f32 {
        self.range.min(self.shadow_distance).max(0.0)
    }

    /// Bounds of the shadow-casting volume.
    pub fn shadow_bounds(&self) -> AABB {
        self.volume_bounds(self.shadow_reach())
    }

    /// Whether a caster's bounds fall inside this light's shadow volume.
    ///
    /// Point lights test against the sphere of `shadow_reach()`; spot
    /// lights against the bounds of their shadow cone.
    pub fn reaches(&self, bounds: &AABB) -> bool {
        match self.light_type {
            LightType::Point => bounds.intersects_sphere(self.position, self.shadow_reach()),
            LightType::Spot { .. } => bounds.intersects(&self.shadow_bounds()),
        }
    }

    /// Whether the culling mask includes `layer`.
    pub fn affects_layer(&self, layer: u8) -> bool {
        layer < 32 && self.culling_mask & (1u32 << layer) != 0
    }

    fn volume_bounds(&self, reach: f32) -> AABB {
        match self.light_type {
            LightType::Point => AABB::from_sphere(self.position, reach),
            LightType::Spot { direction, angle } => {
                spot_cone_bounds(self.position, direction, angle, reach)
                    .unwrap_or_else(|| AABB::from_sphere(self.position, reach))
            }
        }
    }
}

/// Bounds of a cone: apex plus the base disc.
///
/// The disc of radius `r` perpendicular to unit `d` spans
/// `r * sqrt(1 - d_i²)` along axis `i`. `None` for cones at least a
/// hemisphere wide or without a direction.
fn spot_cone_bounds(apex: Vec3, direction: Vec3, angle: f32, reach: f32) -> Option<AABB> {
    let half = angle * 0.5;
    if direction == Vec3::ZERO || half >= std::f32::consts::FRAC_PI_2 {
        return None;
    }
    let base = apex + direction * reach;
    let radius = reach * half.tan();
    let extents = Vec3::new(
        radius * (1.0 - direction.x * direction.x).max(0.0).sqrt(),
        radius * (1.0 - direction.y * direction.y).max(0.0).sqrt(),
        radius * (1.0 - direction.z * direction.z).max(0.0).sqrt(),
    );
    let mut bounds = AABB::from_center_extents(base, extents);
    bounds.include_point(apex);
    Some(bounds)
}

// ===== CHILDREN =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChildKind {
    Renderable,
    Light(LightInfo),
    Terrain,
}

impl ChildKind {
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            ChildKind::Renderable => ObjectKind::Renderable,
            ChildKind::Light(_) => ObjectKind::Light,
            ChildKind::Terrain => ObjectKind::Terrain,
        }
    }
}

/// One object attached to a member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberChild {
    pub handle: ObjectHandle,
    pub kind: ChildKind,
    /// World-space bounds
    pub bounds: AABB,
    pub casts_shadow: bool,
    /// Layer index tested against light culling masks (0..32)
    pub layer: u8,
}

impl MemberChild {
    pub fn renderable(handle: ObjectHandle, bounds: AABB) -> Self {
        Self { handle, kind: ChildKind::Renderable, bounds, casts_shadow: false, layer: 0 }
    }

    pub fn terrain(handle: ObjectHandle, bounds: AABB) -> Self {
        Self { handle, kind: ChildKind::Terrain, bounds, casts_shadow: false, layer: 0 }
    }

    /// Light child; its bounds are the lit volume.
    pub fn light(handle: ObjectHandle, info: LightInfo) -> Self {
        Self {
            handle,
            kind: ChildKind::Light(info),
            bounds: info.bounds(),
            casts_shadow: false,
            layer: 0,
        }
    }

    pub fn with_shadow_casting(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn object_kind(&self) -> ObjectKind {
        self.kind.object_kind()
    }

    pub fn light_info(&self) -> Option<&LightInfo> {
        match &self.kind {
            ChildKind::Light(info) => Some(info),
            _ => None,
        }
    }

    /// Renderables and terrain patches flagged as shadow casters.
    pub fn is_shadow_caster(&self) -> bool {
        self.casts_shadow && !matches!(self.kind, ChildKind::Light(_))
    }
}

/// Reference to one child of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildRef {
    pub member: MemberKey,
    pub index: u32,
}

// ===== MEMBER =====

#[derive(Debug, Clone, Default)]
pub struct Member {
    children: Vec<MemberChild>,
    granularity: CullGranularity,
    render_bounds: Option<AABB>,
    light_bounds: Option<AABB>,
    pub(crate) sectors: Vec<SectorKey>,
    pub(crate) occluders: Vec<OccluderKey>,
}

impl Member {
    pub fn new(granularity: CullGranularity) -> Self {
        Self { granularity, ..Default::default() }
    }

    /// Builder-style child insertion.
    pub fn with_child(mut self, child: MemberChild) -> Self {
        self.push_child(child);
        self
    }

    /// Add a child and grow the aggregate bounds.
    pub fn push_child(&mut self, child: MemberChild) {
        let slot = match child.kind {
            ChildKind::Light(_) => &mut self.light_bounds,
            _ => &mut self.render_bounds,
        };
        grow(slot, &child.bounds);
        self.children.push(child);
    }

    /// Rebuild both aggregate bounds from scratch.
    pub fn recompute_bounds(&mut self) {
        self.render_bounds = None;
        self.light_bounds = None;
        for child in &self.children {
            let slot = match child.kind {
                ChildKind::Light(_) => &mut self.light_bounds,
                _ => &mut self.render_bounds,
            };
            grow(slot, &child.bounds);
        }
    }

    pub(crate) fn set_children(&mut self, children: Vec<MemberChild>) {
        self.children = children;
        self.recompute_bounds();
    }

    // ===== GETTERS =====

    pub fn children(&self) -> &[MemberChild] {
        &self.children
    }

    pub fn child(&self, index: u32) -> Option<&MemberChild> {
        self.children.get(index as usize)
    }

    pub fn granularity(&self) -> CullGranularity {
        self.granularity
    }

    pub fn set_granularity(&mut self, granularity: CullGranularity) {
        self.granularity = granularity;
    }

    /// Union of renderable and terrain children bounds.
    pub fn render_bounds(&self) -> Option<&AABB> {
        self.render_bounds.as_ref()
    }

    /// Union of light children bounds.
    pub fn light_bounds(&self) -> Option<&AABB> {
        self.light_bounds.as_ref()
    }

    /// Union of both aggregate bounds.
    pub fn bounds(&self) -> Option<AABB> {
        match (self.render_bounds, self.light_bounds) {
            (Some(r), Some(l)) => Some(r.union(&l)),
            (r, l) => r.or(l),
        }
    }

    /// Sectors this member is attached to.
    pub fn sectors(&self) -> &[SectorKey] {
        &self.sectors
    }

    /// Occluders owned by this member.
    pub fn occluders(&self) -> &[OccluderKey] {
        &self.occluders
    }

    /// Whether any child casts shadows.
    pub fn has_shadow_casters(&self) -> bool {
        self.children.iter().any(MemberChild::is_shadow_caster)
    }
}

fn grow(slot: &mut Option<AABB>, bounds: &AABB) {
    *slot = Some(match *slot {
        Some(current) => current.union(bounds),
        None => *bounds,
    });
}

// ===== OBSERVER =====

/// Notified whenever the set of sectors a member is attached to changes.
///
/// The graph's own sector→occluder index implements this; hosts may
/// register additional observers with `SceneGraph::add_member_observer`.
pub trait MemberObserver: Send + Sync {
    fn on_sectors_changed(&mut self, member: MemberKey, left: &[SectorKey], joined: &[SectorKey]);
}

#[cfg(test)]
#[path = "member_tests.rs"]
mod tests;
