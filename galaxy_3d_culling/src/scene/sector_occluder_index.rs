/// SectorOccluderIndex: fast sector → occluders lookup.
///
/// Standalone occluders are registered once with the sectors their world
/// bounds overlap. Member-owned occluders follow their member: the index
/// is a `MemberObserver` and moves them between sectors whenever the
/// member's sector set changes.

use rustc_hash::FxHashMap;
use super::member::{MemberKey, MemberObserver};
use super::occluder::OccluderKey;
use super::sector::SectorKey;

#[derive(Debug, Default)]
pub struct SectorOccluderIndex {
    by_sector: FxHashMap<SectorKey, Vec<OccluderKey>>,
    by_member: FxHashMap<MemberKey, Vec<OccluderKey>>,
    sectors_of: FxHashMap<OccluderKey, Vec<SectorKey>>,
}

impl SectorOccluderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occluders attached to a sector.
    pub fn occluders_in(&self, sector: SectorKey) -> &[OccluderKey] {
        self.by_sector.get(&sector).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sectors an occluder is attached to.
    pub fn sectors_of(&self, occluder: OccluderKey) -> &[SectorKey] {
        self.sectors_of.get(&occluder).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Occluders owned by a member.
    pub fn member_occluders(&self, member: MemberKey) -> &[OccluderKey] {
        self.by_member.get(&member).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Register an occluder in a fixed set of sectors.
    pub fn insert(&mut self, occluder: OccluderKey, sectors: &[SectorKey]) {
        for &sector in sectors {
            self.attach(occluder, sector);
        }
    }

    /// Register an occluder owned by `member`, currently in `sectors`.
    pub fn insert_owned(&mut self, occluder: OccluderKey, member: MemberKey, sectors: &[SectorKey]) {
        self.by_member.entry(member).or_default().push(occluder);
        self.insert(occluder, sectors);
    }

    /// Move a standalone occluder to a new set of sectors.
    pub fn relocate(&mut self, occluder: OccluderKey, sectors: &[SectorKey]) {
        let old = self.sectors_of.remove(&occluder).unwrap_or_default();
        for sector in old {
            self.detach(occluder, sector);
        }
        self.insert(occluder, sectors);
    }

    /// Forget an occluder entirely.
    pub fn remove(&mut self, occluder: OccluderKey) {
        if let Some(sectors) = self.sectors_of.remove(&occluder) {
            for sector in sectors {
                self.detach(occluder, sector);
            }
        }
        self.by_member.retain(|_, owned| {
            owned.retain(|&k| k != occluder);
            !owned.is_empty()
        });
    }

    /// Forget a sector; occluders stay registered in their other sectors.
    pub fn remove_sector(&mut self, sector: SectorKey) {
        if let Some(occluders) = self.by_sector.remove(&sector) {
            for occluder in occluders {
                if let Some(sectors) = self.sectors_of.get_mut(&occluder) {
                    sectors.retain(|&s| s != sector);
                }
            }
        }
    }

    fn attach(&mut self, occluder: OccluderKey, sector: SectorKey) {
        let in_sector = self.by_sector.entry(sector).or_default();
        if in_sector.contains(&occluder) {
            return;
        }
        in_sector.push(occluder);
        self.sectors_of.entry(occluder).or_default().push(sector);
    }

    fn detach(&mut self, occluder: OccluderKey, sector: SectorKey) {
        if let Some(in_sector) = self.by_sector.get_mut(&sector) {
            in_sector.retain(|&k| k != occluder);
            if in_sector.is_empty() {
                self.by_sector.remove(&sector);
            }
        }
        if let Some(sectors) = self.sectors_of.get_mut(&occluder) {
            sectors.retain(|&s| s != sector);
        }
    }
}

impl MemberObserver for SectorOccluderIndex {
    fn on_sectors_changed(&mut self, member: MemberKey, left: &[SectorKey], joined: &[SectorKey]) {
        let Some(owned) = self.by_member.get(&member).cloned() else {
            return;
        };
        for occluder in owned {
            for &sector in left {
                self.detach(occluder, sector);
            }
            for &sector in joined {
                self.attach(occluder, sector);
            }
        }
    }
}

#[cfg(test)]
#[path = "sector_occluder_index_tests.rs"]
mod tests;
