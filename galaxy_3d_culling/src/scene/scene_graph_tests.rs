use std::sync::{Arc, Mutex};
use glam::{Mat4, Vec3};
use crate::error::Galaxy3dError;
use crate::geometry::AABB;
use crate::scene::{
    CullGranularity, Member, MemberChild, MemberKey, MemberObserver, ObjectHandle,
    OccluderDesc, PortalDesc, PortalFlags, SectorKey,
};
use super::*;

fn boxed(min: (f32, f32, f32), max: (f32, f32, f32)) -> AABB {
    AABB::new(Vec3::new(min.0, min.1, min.2), Vec3::new(max.0, max.1, max.2))
}

/// Two sectors along Z joined at z = 0.
fn two_sectors(graph: &mut SceneGraph) -> (SectorKey, SectorKey) {
    let near = graph.add_sector(boxed((-10.0, -5.0, 0.0), (10.0, 5.0, 20.0)), false);
    let far = graph.add_sector(boxed((-10.0, -5.0, -20.0), (10.0, 5.0, 0.0)), false);
    (near, far)
}

fn square_portal(front: Option<SectorKey>, back: Option<SectorKey>) -> PortalDesc {
    PortalDesc {
        vertices: vec![
            Vec3::new(-2.0, -2.0, 0.0),
            Vec3::new(2.0, -2.0, 0.0),
            Vec3::new(2.0, 2.0, 0.0),
            Vec3::new(-2.0, 2.0, 0.0),
        ],
        front,
        back,
        flags: PortalFlags::empty(),
    }
}

fn member_at(handle: u32, center: Vec3) -> Member {
    Member::new(CullGranularity::Group).with_child(MemberChild::renderable(
        ObjectHandle(handle),
        AABB::from_center_extents(center, Vec3::splat(0.5)),
    ))
}

fn square_occluder(z: f32, owner: Option<MemberKey>) -> OccluderDesc {
    OccluderDesc {
        hull: vec![
            Vec3::new(-3.0, -3.0, 0.0),
            Vec3::new(3.0, -3.0, 0.0),
            Vec3::new(3.0, 3.0, 0.0),
            Vec3::new(-3.0, 3.0, 0.0),
        ],
        transform: Mat4::from_translation(Vec3::new(0.0, 0.0, z)),
        owner,
        ..Default::default()
    }
}

type ChangeLog = Arc<Mutex<Vec<(MemberKey, Vec<SectorKey>, Vec<SectorKey>)>>>;

struct RecordingObserver {
    changes: ChangeLog,
}

impl MemberObserver for RecordingObserver {
    fn on_sectors_changed(&mut self, member: MemberKey, left: &[SectorKey], joined: &[SectorKey]) {
        self.changes.lock().unwrap().push((member, left.to_vec(), joined.to_vec()));
    }
}

// ============================================================================
// Sectors and containment queries
// ============================================================================

#[test]
fn test_sectors_containing_point() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let mut out = Vec::new();

    graph.sectors_containing_point(Vec3::new(0.0, 0.0, 10.0), &mut out);
    assert_eq!(out, vec![near]);

    // On the shared face: both
    graph.sectors_containing_point(Vec3::ZERO, &mut out);
    assert_eq!(out.len(), 2);
    assert!(out.contains(&far));

    graph.sectors_containing_point(Vec3::new(100.0, 0.0, 0.0), &mut out);
    assert!(out.is_empty());
}

#[test]
fn test_sectors_intersecting() {
    let mut graph = SceneGraph::new();
    let (_, far) = two_sectors(&mut graph);
    let mut out = Vec::new();
    graph.sectors_intersecting(&boxed((0.0, 0.0, -8.0), (1.0, 1.0, -7.0)), &mut out);
    assert_eq!(out, vec![far]);
}

#[test]
fn test_remove_sector_detaches_portals_and_members() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let portal = graph.add_portal(square_portal(Some(near), Some(far))).unwrap();
    let member = graph.add_member(member_at(1, Vec3::new(0.0, 0.0, -5.0)));

    graph.remove_sector(far).unwrap();

    assert_eq!(graph.portal(portal).unwrap().back(), None);
    assert!(graph.member(member).unwrap().sectors().is_empty());
    assert_eq!(graph.remove_sector(far), Err(Galaxy3dError::InvalidKey(format!("Sector {:?} not found", far))));
}

// ============================================================================
// Portals
// ============================================================================

#[test]
fn test_add_portal_links_both_sectors() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let portal = graph.add_portal(square_portal(Some(near), Some(far))).unwrap();

    assert_eq!(graph.sector(near).unwrap().portals(), &[portal]);
    assert_eq!(graph.sector(far).unwrap().portals(), &[portal]);
    assert_eq!(graph.portal_count(), 1);
}

#[test]
fn test_add_portal_rejects_bad_input() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);

    let mut desc = square_portal(Some(near), Some(far));
    desc.vertices.truncate(2);
    assert!(matches!(graph.add_portal(desc), Err(Galaxy3dError::InvalidGeometry(_))));

    graph.remove_sector(far).unwrap();
    assert!(matches!(
        graph.add_portal(square_portal(Some(near), Some(far))),
        Err(Galaxy3dError::InvalidKey(_))
    ));
    assert_eq!(graph.portal_count(), 0);
}

#[test]
fn test_add_pass_through_link_without_geometry() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let mut desc = square_portal(Some(near), Some(far));
    desc.vertices.truncate(2);
    desc.flags = PortalFlags::PASS_THROUGH;

    let link = graph.add_portal(desc).unwrap();
    assert!(graph.portal(link).unwrap().is_link());
    assert_eq!(graph.sector(far).unwrap().portals(), &[link]);

    assert!(matches!(
        graph.set_portal_flags(link, PortalFlags::empty()),
        Err(Galaxy3dError::InvalidGeometry(_))
    ));
    assert!(graph.portal(link).unwrap().is_pass_through());
}

#[test]
fn test_remove_portal_and_flags() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let portal = graph.add_portal(square_portal(Some(near), Some(far))).unwrap();

    graph.set_portal_flags(portal, PortalFlags::CLOSED).unwrap();
    assert!(graph.portal(portal).unwrap().is_closed());

    graph.remove_portal(portal).unwrap();
    assert!(graph.sector(near).unwrap().portals().is_empty());
    assert!(graph.set_portal_flags(portal, PortalFlags::empty()).is_err());
    assert!(graph.remove_portal(portal).is_err());
}

// ============================================================================
// Members
// ============================================================================

#[test]
fn test_add_member_attaches_overlapping_sectors() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);

    let inside = graph.add_member(member_at(1, Vec3::new(0.0, 0.0, 10.0)));
    let straddling = graph.add_member(member_at(2, Vec3::ZERO));

    assert_eq!(graph.member(inside).unwrap().sectors(), &[near]);
    assert_eq!(graph.member(straddling).unwrap().sectors().len(), 2);
    assert!(graph.sector(far).unwrap().members().contains(&straddling));
    assert_eq!(graph.child_count(), 2);
}

#[test]
fn test_set_member_sectors_notifies_observers() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let changes: ChangeLog = Arc::new(Mutex::new(Vec::new()));
    graph.add_member_observer(Box::new(RecordingObserver { changes: changes.clone() }));

    let member = graph.add_member(member_at(1, Vec3::new(0.0, 0.0, 10.0)));
    graph.set_member_sectors(member, &[far]).unwrap();

    let log = changes.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0], (member, vec![], vec![near]));
    assert_eq!(log[1], (member, vec![near], vec![far]));
    assert!(graph.sector(near).unwrap().members().is_empty());
}

#[test]
fn test_set_member_sectors_unchanged_is_silent() {
    let mut graph = SceneGraph::new();
    let (near, _) = two_sectors(&mut graph);
    let member = graph.add_member(member_at(1, Vec3::new(0.0, 0.0, 10.0)));
    let changes: ChangeLog = Arc::new(Mutex::new(Vec::new()));
    graph.add_member_observer(Box::new(RecordingObserver { changes: changes.clone() }));

    graph.set_member_sectors(member, &[near]).unwrap();
    assert!(changes.lock().unwrap().is_empty());
}

#[test]
fn test_set_member_children_moves_member() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let member = graph.add_member(member_at(1, Vec3::new(0.0, 0.0, 10.0)));

    graph
        .set_member_children(member, vec![MemberChild::renderable(
            ObjectHandle(1),
            AABB::from_center_extents(Vec3::new(0.0, 0.0, -10.0), Vec3::splat(0.5)),
        )])
        .unwrap();

    assert_eq!(graph.member(member).unwrap().sectors(), &[far]);
    assert!(!graph.sector(near).unwrap().members().contains(&member));
}

#[test]
fn test_member_invalid_keys() {
    let mut graph = SceneGraph::new();
    let (near, _) = two_sectors(&mut graph);
    let member = graph.add_member(member_at(1, Vec3::ZERO));
    graph.remove_member(member).unwrap();

    assert!(matches!(graph.remove_member(member), Err(Galaxy3dError::InvalidKey(_))));
    assert!(graph.set_member_sectors(member, &[near]).is_err());
    assert!(graph.set_member_children(member, Vec::new()).is_err());

    let other = graph.add_member(member_at(2, Vec3::ZERO));
    graph.remove_sector(near).unwrap();
    assert!(graph.set_member_sectors(other, &[near]).is_err());
}

#[test]
fn test_new_sector_adopts_existing_members() {
    let mut graph = SceneGraph::new();
    let member = graph.add_member(member_at(1, Vec3::new(50.0, 0.0, 0.0)));
    assert!(graph.member(member).unwrap().sectors().is_empty());

    let sector = graph.add_sector(boxed((40.0, -5.0, -5.0), (60.0, 5.0, 5.0)), false);
    assert_eq!(graph.member(member).unwrap().sectors(), &[sector]);
}

// ============================================================================
// Occluders
// ============================================================================

#[test]
fn test_standalone_occluder_sectors_from_bounds() {
    let mut graph = SceneGraph::new();
    let (near, _) = two_sectors(&mut graph);
    let occluder = graph.add_occluder(square_occluder(5.0, None)).unwrap();

    assert_eq!(graph.occluders_in_sector(near), &[occluder]);
    assert_eq!(graph.occluder_sectors(occluder), &[near]);
}

#[test]
fn test_owned_occluder_follows_member() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let member = graph.add_member(member_at(1, Vec3::new(0.0, 0.0, 10.0)));
    let occluder = graph.add_occluder(square_occluder(10.0, Some(member))).unwrap();

    assert_eq!(graph.occluders_in_sector(near), &[occluder]);
    assert_eq!(graph.member(member).unwrap().occluders(), &[occluder]);

    graph.set_member_sectors(member, &[far]).unwrap();
    assert!(graph.occluders_in_sector(near).is_empty());
    assert_eq!(graph.occluders_in_sector(far), &[occluder]);

    graph.remove_member(member).unwrap();
    assert!(graph.occluder(occluder).is_none());
    assert!(graph.occluders_in_sector(far).is_empty());
}

#[test]
fn test_occluder_invalid_owner_and_removal() {
    let mut graph = SceneGraph::new();
    let (near, _) = two_sectors(&mut graph);
    let member = graph.add_member(member_at(1, Vec3::new(0.0, 0.0, 10.0)));
    graph.remove_member(member).unwrap();

    assert!(matches!(
        graph.add_occluder(square_occluder(5.0, Some(member))),
        Err(Galaxy3dError::InvalidKey(_))
    ));

    let occluder = graph.add_occluder(square_occluder(5.0, None)).unwrap();
    graph.remove_occluder(occluder).unwrap();
    assert!(graph.occluders_in_sector(near).is_empty());
    assert!(graph.remove_occluder(occluder).is_err());
}

#[test]
fn test_moving_standalone_occluder_relocates_it() {
    let mut graph = SceneGraph::new();
    let (near, far) = two_sectors(&mut graph);
    let occluder = graph.add_occluder(square_occluder(5.0, None)).unwrap();

    graph
        .set_occluder_transform(occluder, Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)))
        .unwrap();
    assert!(graph.occluders_in_sector(near).is_empty());
    assert_eq!(graph.occluders_in_sector(far), &[occluder]);
}
