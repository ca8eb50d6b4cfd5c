/// Leaf cull: admit the members of one sector seen through one frustum.
///
/// The unit of work handed to the worker pool. A member's aggregate bounds
/// are tested first (render bounds for renderables and terrain patches,
/// light bounds for lights); `Individual` members then test each child.
/// Bounds pass when they intersect the frustum and no active occluder
/// fully hides them.

use crate::geometry::{intersects_aabb, Plane, AABB};
use crate::scene::{ChildKind, ChildRef, CullGranularity, Member, MemberKey, SceneGraph, SectorKey};
use super::occluder_set::OccluderSet;
use super::visible_set::VisibleSet;

pub(crate) fn cull_sector(
    scene: &SceneGraph,
    sector: SectorKey,
    planes: &[Plane],
    occluders: &OccluderSet,
    out: &mut VisibleSet,
) {
    let Some(sector) = scene.sector(sector) else {
        return;
    };
    for &key in sector.members() {
        if let Some(member) = scene.member(key) {
            cull_member(key, member, planes, occluders, out);
        }
    }
}

fn cull_member(
    key: MemberKey,
    member: &Member,
    planes: &[Plane],
    occluders: &OccluderSet,
    out: &mut VisibleSet,
) {
    let visible = |bounds: &AABB| intersects_aabb(planes, bounds) && !occluders.occludes(bounds);

    let render_pass = member.render_bounds().is_some_and(|b| visible(b));
    let light_pass = member.light_bounds().is_some_and(|b| visible(b));
    if !render_pass && !light_pass {
        return;
    }

    for (index, child) in member.children().iter().enumerate() {
        let group_pass = match child.kind {
            ChildKind::Light(_) => light_pass,
            ChildKind::Renderable | ChildKind::Terrain => render_pass,
        };
        if !group_pass {
            continue;
        }
        if member.granularity() == CullGranularity::Individual && !visible(&child.bounds) {
            continue;
        }
        out.admit_child(ChildRef { member: key, index: index as u32 }, child);
    }
}

#[cfg(test)]
#[path = "leaf_tests.rs"]
mod tests;
