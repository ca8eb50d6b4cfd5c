/// Shadow post-pass: admit shadow casters reached by visible lights.
///
/// A caster outside the view may still throw a shadow into it. After the
/// graph walk, every visible shadow-casting light is assigned to the
/// sectors its member overlaps plus the sectors its shadow bounds reach;
/// each sector's casters are then tested against the lights assigned to
/// it. One (sector, lights) group is one unit of work.

use rustc_hash::FxHashMap;
use crate::scene::{
    ChildRef, CullGranularity, LightInfo, Member, MemberKey, SceneGraph, SectorKey,
};
use super::visible_set::VisibleSet;

/// A visible light casting shadows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ShadowLight {
    pub(crate) info: LightInfo,
}

/// Group the visible shadow lights by the sectors their shadows may reach.
pub(crate) fn group_shadow_lights(
    scene: &SceneGraph,
    visible: &VisibleSet,
    sector_scratch: &mut Vec<SectorKey>,
) -> FxHashMap<SectorKey, Vec<ShadowLight>> {
    let mut groups: FxHashMap<SectorKey, Vec<ShadowLight>> = FxHashMap::default();

    for &child_ref in visible.shadow_lights().values() {
        let Some(info) = scene.child(child_ref).and_then(|c| c.light_info()) else {
            continue;
        };
        let light = ShadowLight { info: *info };

        scene.sectors_intersecting(&info.shadow_bounds(), sector_scratch);
        if let Some(member) = scene.member(child_ref.member) {
            for &sector in member.sectors() {
                if !sector_scratch.contains(&sector) {
                    sector_scratch.push(sector);
                }
            }
        }
        for &sector in sector_scratch.iter() {
            groups.entry(sector).or_default().push(light);
        }
    }

    groups
}

/// Admit the shadow casters of one sector reached by any of `lights`.
pub(crate) fn cull_shadow_casters(
    scene: &SceneGraph,
    sector: SectorKey,
    lights: &[ShadowLight],
    out: &mut VisibleSet,
) {
    let Some(sector) = scene.sector(sector) else {
        return;
    };
    for &key in sector.members() {
        let Some(member) = scene.member(key) else {
            continue;
        };
        if !member.has_shadow_casters() {
            continue;
        }
        match member.granularity() {
            CullGranularity::Individual => casters_outer(key, member, lights, out),
            CullGranularity::Group => lights_outer(key, member, lights, out),
        }
    }
}

/// Each caster against each light, stopping at the first light that reaches it.
fn casters_outer(key: MemberKey, member: &Member, lights: &[ShadowLight], out: &mut VisibleSet) {
    for (index, child) in member.children().iter().enumerate() {
        if !child.is_shadow_caster() {
            continue;
        }
        let reached = lights
            .iter()
            .any(|light| light.info.affects_layer(child.layer) && light.info.reaches(&child.bounds));
        if reached {
            out.admit_child(ChildRef { member: key, index: index as u32 }, child);
        }
    }
}

/// One aggregate test per light, then the casters it may reach.
fn lights_outer(key: MemberKey, member: &Member, lights: &[ShadowLight], out: &mut VisibleSet) {
    let Some(aggregate) = member.render_bounds() else {
        return;
    };
    for light in lights {
        if !light.info.reaches(aggregate) {
            continue;
        }
        for (index, child) in member.children().iter().enumerate() {
            if child.is_shadow_caster()
                && light.info.affects_layer(child.layer)
                && light.info.reaches(&child.bounds)
            {
                out.admit_child(ChildRef { member: key, index: index as u32 }, child);
            }
        }
    }
}

#[cfg(test)]
#[path = "shadow_pass_tests.rs"]
mod tests;
