/// SceneGraph: registry of sectors, portals, occluders and members.
///
/// Owned by the host and handed to the culler as an `Arc<SceneGraph>`.
/// Every element is stored in a SlotMap: keys are stable across other
/// removals and become invalid only when their own element is removed.
///
/// The graph keeps derived data consistent on every mutation: sector
/// portal/member lists, member sector sets, and the sector → occluder
/// index (driven through `MemberObserver` notifications).

use glam::{Mat4, Vec3};
use slotmap::SlotMap;
use crate::engine_err;
use crate::error::Galaxy3dResult;
use crate::geometry::AABB;
use super::member::{ChildRef, Member, MemberChild, MemberKey, MemberObserver};
use super::occluder::{Occluder, OccluderDesc, OccluderKey};
use super::portal::{Portal, PortalDesc, PortalFlags, PortalKey};
use super::sector::{Sector, SectorKey};
use super::sector_occluder_index::SectorOccluderIndex;

const SOURCE: &str = "galaxy3d::SceneGraph";

#[derive(Default)]
pub struct SceneGraph {
    sectors: SlotMap<SectorKey, Sector>,
    portals: SlotMap<PortalKey, Portal>,
    occluders: SlotMap<OccluderKey, Occluder>,
    members: SlotMap<MemberKey, Member>,
    occluder_index: SectorOccluderIndex,
    /// Host observers notified after the occluder index
    observers: Vec<Box<dyn MemberObserver>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== SECTORS =====

    /// Add a sector covering `bounds`.
    ///
    /// Existing members and standalone occluders overlapping the new
    /// sector are attached to it.
    pub fn add_sector(&mut self, bounds: AABB, contiguous_terrain: bool) -> SectorKey {
        let key = self.sectors.insert(Sector::new(bounds, contiguous_terrain));

        let overlapping: Vec<MemberKey> = self
            .members
            .iter()
            .filter(|(_, m)| m.bounds().is_some_and(|b| b.intersects(&bounds)))
            .map(|(k, _)| k)
            .collect();
        for member in overlapping {
            self.attach_member(member, key);
            self.notify_sectors_changed(member, &[], &[key]);
        }

        let standalone: Vec<OccluderKey> = self
            .occluders
            .iter()
            .filter(|(_, o)| o.owner().is_none() && o.world_bounds().intersects(&bounds))
            .map(|(k, _)| k)
            .collect();
        for occluder in standalone {
            self.occluder_index.insert(occluder, &[key]);
        }

        key
    }

    /// Remove a sector.
    ///
    /// Portals leading into it lose that side, members leave it, and
    /// occluders are dropped from it.
    pub fn remove_sector(&mut self, key: SectorKey) -> Galaxy3dResult<()> {
        let Some(sector) = self.sectors.remove(key) else {
            return Err(engine_err!(SOURCE, InvalidKey, "Sector {:?} not found", key));
        };

        for portal in &sector.portals {
            if let Some(portal) = self.portals.get_mut(*portal) {
                portal.detach_sector(key);
            }
        }
        for &member in &sector.members {
            if let Some(m) = self.members.get_mut(member) {
                m.sectors.retain(|&s| s != key);
            }
            self.notify_sectors_changed(member, &[key], &[]);
        }
        self.occluder_index.remove_sector(key);
        Ok(())
    }

    pub fn sector(&self, key: SectorKey) -> Option<&Sector> {
        self.sectors.get(key)
    }

    pub fn sectors(&self) -> impl Iterator<Item = (SectorKey, &Sector)> {
        self.sectors.iter()
    }

    pub fn sector_keys(&self) -> impl Iterator<Item = SectorKey> + '_ {
        self.sectors.keys()
    }

    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    /// Sectors whose region contains `point`, written into `out`.
    pub fn sectors_containing_point(&self, point: Vec3, out: &mut Vec<SectorKey>) {
        out.clear();
        out.extend(
            self.sectors
                .iter()
                .filter(|(_, s)| s.bounds().contains_point(point))
                .map(|(k, _)| k),
        );
    }

    /// Sectors whose region overlaps `bounds`, written into `out`.
    pub fn sectors_intersecting(&self, bounds: &AABB, out: &mut Vec<SectorKey>) {
        out.clear();
        out.extend(
            self.sectors
                .iter()
                .filter(|(_, s)| s.bounds().intersects(bounds))
                .map(|(k, _)| k),
        );
    }

    // ===== PORTALS =====

    /// Add a portal between its front and back sectors.
    ///
    /// Fails if a referenced sector does not exist or the vertex loop is
    /// degenerate (fewer than 3 vertices or zero area). A degenerate
    /// `PASS_THROUGH` portal is accepted as a link without shape.
    pub fn add_portal(&mut self, desc: PortalDesc) -> Galaxy3dResult<PortalKey> {
        for sector in [desc.front, desc.back].into_iter().flatten() {
            if !self.sectors.contains_key(sector) {
                return Err(engine_err!(SOURCE, InvalidKey, "Portal sector {:?} not found", sector));
            }
        }
        let vertex_count = desc.vertices.len();
        let Some(portal) = Portal::from_desc(desc) else {
            return Err(engine_err!(
                SOURCE,
                InvalidGeometry,
                "Portal with {} vertices is degenerate",
                vertex_count
            ));
        };

        let (front, back) = (portal.front(), portal.back());
        let key = self.portals.insert(portal);
        if let Some(sector) = front.and_then(|s| self.sectors.get_mut(s)) {
            sector.portals.push(key);
        }
        if back != front {
            if let Some(sector) = back.and_then(|s| self.sectors.get_mut(s)) {
                sector.portals.push(key);
            }
        }
        Ok(key)
    }

    pub fn remove_portal(&mut self, key: PortalKey) -> Galaxy3dResult<()> {
        let Some(portal) = self.portals.remove(key) else {
            return Err(engine_err!(SOURCE, InvalidKey, "Portal {:?} not found", key));
        };
        for sector in [portal.front(), portal.back()].into_iter().flatten() {
            if let Some(sector) = self.sectors.get_mut(sector) {
                sector.portals.retain(|&p| p != key);
            }
        }
        Ok(())
    }

    /// Open, close or mark a portal pass-through.
    pub fn set_portal_flags(&mut self, key: PortalKey, flags: PortalFlags) -> Galaxy3dResult<()> {
        match self.portals.get_mut(key) {
            Some(portal) => {
                if portal.set_flags(flags) {
                    Ok(())
                } else {
                    Err(engine_err!(
                        SOURCE,
                        InvalidGeometry,
                        "Portal {:?} is a link without shape and must stay pass-through",
                        key
                    ))
                }
            }
            None => Err(engine_err!(SOURCE, InvalidKey, "Portal {:?} not found", key)),
        }
    }

    pub fn portal(&self, key: PortalKey) -> Option<&Portal> {
        self.portals.get(key)
    }

    pub fn portals(&self) -> impl Iterator<Item = (PortalKey, &Portal)> {
        self.portals.iter()
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    // ===== MEMBERS =====

    /// Add a member, attached to every sector its bounds overlap.
    pub fn add_member(&mut self, mut member: Member) -> MemberKey {
        member.sectors.clear();
        member.occluders.clear();
        let mut sectors = Vec::new();
        if let Some(bounds) = member.bounds() {
            self.sectors_intersecting(&bounds, &mut sectors);
        }

        let key = self.members.insert(member);
        for &sector in &sectors {
            self.attach_member(key, sector);
        }
        self.notify_sectors_changed(key, &[], &sectors);
        key
    }

    /// Remove a member and every occluder it owns.
    pub fn remove_member(&mut self, key: MemberKey) -> Galaxy3dResult<()> {
        let Some(member) = self.members.remove(key) else {
            return Err(engine_err!(SOURCE, InvalidKey, "Member {:?} not found", key));
        };

        for &occluder in &member.occluders {
            self.occluders.remove(occluder);
            self.occluder_index.remove(occluder);
        }
        for &sector in &member.sectors {
            if let Some(sector) = self.sectors.get_mut(sector) {
                sector.members.retain(|&m| m != key);
            }
        }
        self.notify_sectors_changed(key, &member.sectors, &[]);
        Ok(())
    }

    /// Attach a member to an explicit set of sectors.
    ///
    /// Observers receive the sectors left and joined.
    pub fn set_member_sectors(&mut self, key: MemberKey, sectors: &[SectorKey]) -> Galaxy3dResult<()> {
        if !self.members.contains_key(key) {
            return Err(engine_err!(SOURCE, InvalidKey, "Member {:?} not found", key));
        }
        if let Some(missing) = sectors.iter().find(|s| !self.sectors.contains_key(**s)) {
            return Err(engine_err!(SOURCE, InvalidKey, "Sector {:?} not found", missing));
        }
        self.apply_member_sectors(key, sectors);
        Ok(())
    }

    /// Replace a member's children.
    ///
    /// Aggregate bounds are recomputed and the member is re-attached to the
    /// sectors its new bounds overlap.
    pub fn set_member_children(&mut self, key: MemberKey, children: Vec<MemberChild>) -> Galaxy3dResult<()> {
        let Some(member) = self.members.get_mut(key) else {
            return Err(engine_err!(SOURCE, InvalidKey, "Member {:?} not found", key));
        };
        member.set_children(children);
        let bounds = member.bounds();

        let mut sectors = Vec::new();
        if let Some(bounds) = bounds {
            self.sectors_intersecting(&bounds, &mut sectors);
        }
        self.apply_member_sectors(key, &sectors);
        Ok(())
    }

    pub fn member(&self, key: MemberKey) -> Option<&Member> {
        self.members.get(key)
    }

    pub fn members(&self) -> impl Iterator<Item = (MemberKey, &Member)> {
        self.members.iter()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Resolve a child reference.
    pub fn child(&self, child: ChildRef) -> Option<&MemberChild> {
        self.members.get(child.member)?.child(child.index)
    }

    /// Total number of children across all members.
    pub fn child_count(&self) -> usize {
        self.members.values().map(|m| m.children().len()).sum()
    }

    /// Register an observer of member sector changes.
    pub fn add_member_observer(&mut self, observer: Box<dyn MemberObserver>) {
        self.observers.push(observer);
    }

    // ===== OCCLUDERS =====

    /// Add an occluder.
    ///
    /// Owned occluders are attached to their member's sectors and follow
    /// them; standalone occluders are attached to every sector their world
    /// bounds overlap. Degenerate hulls are accepted but never occlude.
    pub fn add_occluder(&mut self, desc: OccluderDesc) -> Galaxy3dResult<OccluderKey> {
        if let Some(owner) = desc.owner {
            if !self.members.contains_key(owner) {
                return Err(engine_err!(SOURCE, InvalidKey, "Occluder owner {:?} not found", owner));
            }
        }

        let occluder = Occluder::new(desc);
        let owner = occluder.owner();
        let bounds = *occluder.world_bounds();
        let key = self.occluders.insert(occluder);

        match owner.and_then(|o| self.members.get_mut(o).map(|m| (o, m))) {
            Some((owner, member)) => {
                member.occluders.push(key);
                let sectors = member.sectors.clone();
                self.occluder_index.insert_owned(key, owner, &sectors);
            }
            None => {
                let mut sectors = Vec::new();
                self.sectors_intersecting(&bounds, &mut sectors);
                self.occluder_index.insert(key, &sectors);
            }
        }
        Ok(key)
    }

    pub fn remove_occluder(&mut self, key: OccluderKey) -> Galaxy3dResult<()> {
        let Some(occluder) = self.occluders.remove(key) else {
            return Err(engine_err!(SOURCE, InvalidKey, "Occluder {:?} not found", key));
        };
        if let Some(member) = occluder.owner().and_then(|o| self.members.get_mut(o)) {
            member.occluders.retain(|&k| k != key);
        }
        self.occluder_index.remove(key);
        Ok(())
    }

    /// Move an occluder. Standalone occluders are re-attached to the
    /// sectors their new bounds overlap.
    pub fn set_occluder_transform(&mut self, key: OccluderKey, transform: Mat4) -> Galaxy3dResult<()> {
        let Some(occluder) = self.occluders.get_mut(key) else {
            return Err(engine_err!(SOURCE, InvalidKey, "Occluder {:?} not found", key));
        };
        occluder.set_transform(transform);
        if occluder.owner().is_none() {
            let bounds = *occluder.world_bounds();
            let mut sectors = Vec::new();
            self.sectors_intersecting(&bounds, &mut sectors);
            self.occluder_index.relocate(key, &sectors);
        }
        Ok(())
    }

    pub fn occluder(&self, key: OccluderKey) -> Option<&Occluder> {
        self.occluders.get(key)
    }

    pub fn occluders(&self) -> impl Iterator<Item = (OccluderKey, &Occluder)> {
        self.occluders.iter()
    }

    pub fn occluder_count(&self) -> usize {
        self.occluders.len()
    }

    /// Occluders attached to a sector.
    pub fn occluders_in_sector(&self, sector: SectorKey) -> &[OccluderKey] {
        self.occluder_index.occluders_in(sector)
    }

    /// Sectors an occluder is attached to.
    pub fn occluder_sectors(&self, occluder: OccluderKey) -> &[SectorKey] {
        self.occluder_index.sectors_of(occluder)
    }

    pub fn occluder_index(&self) -> &SectorOccluderIndex {
        &self.occluder_index
    }

    // ===== INTERNAL =====

    fn attach_member(&mut self, member: MemberKey, sector: SectorKey) {
        if let Some(s) = self.sectors.get_mut(sector) {
            if !s.members.contains(&member) {
                s.members.push(member);
            }
        }
        if let Some(m) = self.members.get_mut(member) {
            if !m.sectors.contains(&sector) {
                m.sectors.push(sector);
            }
        }
    }

    fn detach_member(&mut self, member: MemberKey, sector: SectorKey) {
        if let Some(s) = self.sectors.get_mut(sector) {
            s.members.retain(|&m| m != member);
        }
        if let Some(m) = self.members.get_mut(member) {
            m.sectors.retain(|&s| s != sector);
        }
    }

    /// Move a member to exactly `sectors` and notify observers of the diff.
    fn apply_member_sectors(&mut self, key: MemberKey, sectors: &[SectorKey]) {
        let current = match self.members.get(key) {
            Some(member) => member.sectors.clone(),
            None => return,
        };
        let left: Vec<SectorKey> = current.iter().copied().filter(|s| !sectors.contains(s)).collect();
        let mut joined: Vec<SectorKey> = Vec::new();
        for &sector in sectors {
            if !current.contains(&sector) && !joined.contains(&sector) {
                joined.push(sector);
            }
        }

        for &sector in &left {
            self.detach_member(key, sector);
        }
        for &sector in &joined {
            self.attach_member(key, sector);
        }
        if !left.is_empty() || !joined.is_empty() {
            self.notify_sectors_changed(key, &left, &joined);
        }
    }

    fn notify_sectors_changed(&mut self, member: MemberKey, left: &[SectorKey], joined: &[SectorKey]) {
        self.occluder_index.on_sectors_changed(member, left, joined);
        for observer in &mut self.observers {
            observer.on_sectors_changed(member, left, joined);
        }
    }
}

#[cfg(test)]
#[path = "scene_graph_tests.rs"]
mod tests;
