//! Integration tests for properties every cull must satisfy
//!
//! Each test sweeps several viewpoints over the same scene.
//!
//! Run with: cargo test --test culling_properties_integration_tests


use std::sync::Arc;
use galaxy_3d_culling::galaxy3d::camera::{CullView, CullingCamera};
use galaxy_3d_culling::galaxy3d::culling::{CullingConfig, SectorCuller};
use galaxy_3d_culling::galaxy3d::geometry::AABB;
use galaxy_3d_culling::galaxy3d::scene::{
    CullGranularity, LightInfo, Member, MemberChild, ObjectHandle, ObjectKind, PortalFlags,
    SceneGraph,
};
use galaxy_3d_culling::glam::{Quat, Vec3};
use scene_test_utils::{square_occluder, view, RoomChain, StateSink};

/// Boxes on a 5 x 3 x 4 grid inside room `room` of a chain.
fn fill_room(chain: &mut RoomChain, room: usize, first_handle: u32) -> Vec<(u32, AABB)> {
    let z_max = 20.0 - 20.0 * room as f32;
    let mut boxes = Vec::new();
    let mut handle = first_handle;
    for ix in 0..5 {
        for iy in 0..3 {
            for iz in 0..4 {
                let center = Vec3::new(
                    -8.0 + 4.0 * ix as f32,
                    -3.0 + 3.0 * iy as f32,
                    z_max - 2.5 - 5.0 * iz as f32,
                );
                chain.add_box(handle, center);
                boxes.push((handle, AABB::from_center_extents(center, Vec3::splat(0.5))));
                handle += 1;
            }
        }
    }
    boxes
}

/// Viewpoints inside room 0 with assorted headings.
fn viewpoints() -> Vec<CullView> {
    let positions = [
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(6.0, 2.0, 18.0),
        Vec3::new(-7.0, -3.0, 4.0),
        Vec3::new(2.0, 1.0, 1.0),
    ];
    let headings = [
        Quat::IDENTITY,
        Quat::from_rotation_y(0.6),
        Quat::from_rotation_y(-0.9),
        Quat::from_rotation_x(-0.3) * Quat::from_rotation_y(0.2),
        Quat::from_rotation_y(std::f32::consts::PI),
    ];
    positions
        .iter()
        .flat_map(|&p| headings.iter().map(move |&r| view(p, r)))
        .collect()
}

// ============================================================================
// SOUNDNESS
// ============================================================================

#[test]
fn test_integration_everything_in_view_is_visible() {
    let mut chain = RoomChain::new(2, 3.0, PortalFlags::PASS_THROUGH);
    let mut boxes = fill_room(&mut chain, 0, 0);
    boxes.extend(fill_room(&mut chain, 1, 1000));
    let scene = Arc::new(chain.graph);
    let mut culler = SectorCuller::new(CullingConfig::default());

    for view in viewpoints() {
        let visible = culler.cull(&scene, &view);
        for (handle, bounds) in &boxes {
            if view.frustum().intersects_aabb(bounds) {
                assert!(
                    visible.contains(ObjectKind::Renderable, ObjectHandle(*handle)),
                    "box {handle} in view from {} is missing",
                    view.position()
                );
            }
        }
    }
}

// ============================================================================
// NON-LEAKAGE
// ============================================================================

#[test]
fn test_integration_unreachable_rooms_stay_hidden() {
    let mut chain = RoomChain::new(3, 3.0, PortalFlags::empty());
    fill_room(&mut chain, 1, 1000);
    fill_room(&mut chain, 2, 2000);
    let first = chain.doorways[0];
    chain.graph.set_portal_flags(first, PortalFlags::CLOSED).unwrap();
    let scene = Arc::new(chain.graph);
    let mut culler = SectorCuller::new(CullingConfig::default());

    for view in viewpoints() {
        culler.cull(&scene, &view);
        assert!(culler.visible_set().is_empty(), "leak from {}", view.position());
        assert_eq!(culler.stats().visited_sectors, 1);
    }
}

// ============================================================================
// APPLY IDEMPOTENCE
// ============================================================================

#[test]
fn test_integration_apply_twice_changes_nothing() {
    let mut chain = RoomChain::new(2, 3.0, PortalFlags::empty());
    fill_room(&mut chain, 0, 0);
    fill_room(&mut chain, 1, 1000);
    let scene = Arc::new(chain.graph);
    let mut camera =
        CullingCamera::new(CullingConfig { multi_camera_culling: false, ..Default::default() });

    for view in viewpoints() {
        let mut sink = StateSink::default();
        camera.cull_and_apply(&scene, &view, &mut sink);
        let hidden = sink.hidden.clone();
        let calls = sink.calls;

        let stats = camera.cull_and_apply(&scene, &view, &mut sink);
        assert_eq!(sink.hidden, hidden);
        assert_eq!(sink.calls, calls);
        assert_eq!(stats.shown + stats.hidden, 0);
        assert_eq!(stats.still_hidden, camera.applier().hidden_count());
        camera.end_frame(&mut sink);
    }
}

// ============================================================================
// OCCLUDER MONOTONICITY
// ============================================================================

#[test]
fn test_integration_larger_occluder_never_shows_more() {
    let build = |half: Option<f32>| {
        let mut chain = RoomChain::new(2, 3.0, PortalFlags::empty());
        fill_room(&mut chain, 0, 0);
        fill_room(&mut chain, 1, 1000);
        if let Some(half) = half {
            chain.graph.add_occluder(square_occluder(5.0, half)).unwrap();
        }
        Arc::new(chain.graph)
    };
    let scenes: Vec<Arc<SceneGraph>> =
        [None, Some(1.0), Some(2.0), Some(3.5), Some(4.5)].into_iter().map(build).collect();
    let mut culler = SectorCuller::new(CullingConfig::default());

    for position in [Vec3::new(0.0, 0.0, 12.0), Vec3::new(1.5, -0.5, 16.0)] {
        let view = view(position, Quat::IDENTITY);
        let mut previous: Option<Vec<ObjectHandle>> = None;
        for scene in &scenes {
            let current = culler.cull(scene, &view).sorted_handles(ObjectKind::Renderable);
            if let Some(previous) = &previous {
                assert!(current.iter().all(|h| previous.contains(h)));
            }
            previous = Some(current);
        }
    }
}

// ============================================================================
// WORKER / SERIAL EQUIVALENCE
// ============================================================================

#[test]
fn test_integration_workers_match_serial() {
    let mut chain = RoomChain::new(3, 3.0, PortalFlags::empty());
    fill_room(&mut chain, 0, 0);
    fill_room(&mut chain, 1, 1000);
    fill_room(&mut chain, 2, 2000);
    chain.graph.add_occluder(square_occluder(-25.0, 2.0)).unwrap();
    chain.graph.add_member(Member::new(CullGranularity::Group).with_child(MemberChild::light(
        ObjectHandle(500),
        LightInfo::point(Vec3::new(0.0, 0.0, -10.0), 25.0).with_shadows(f32::INFINITY),
    )));
    let scene = Arc::new(chain.graph);

    let mut serial = SectorCuller::new(CullingConfig::default());
    let mut threaded = SectorCuller::new(CullingConfig { worker_thread_count: 4, ..Default::default() });

    for view in viewpoints() {
        serial.cull(&scene, &view);
        threaded.cull(&scene, &view);
        assert_eq!(threaded.visible_set(), serial.visible_set());
        assert_eq!(threaded.stats(), serial.stats());
    }
}

// ============================================================================
// QUIESCENCE
// ============================================================================

#[test]
fn test_integration_scene_mutable_between_culls() {
    let mut chain = RoomChain::new(2, 3.0, PortalFlags::empty());
    chain.add_box(1, Vec3::new(0.0, 0.0, -10.0));
    let doorway = chain.doorways[0];
    let mut scene = Arc::new(chain.graph);
    let mut culler = SectorCuller::new(CullingConfig { worker_thread_count: 2, ..Default::default() });
    let view = view(Vec3::new(0.0, 0.0, 10.0), Quat::IDENTITY);

    assert!(culler.cull(&scene, &view).contains(ObjectKind::Renderable, ObjectHandle(1)));

    let graph = Arc::get_mut(&mut scene).expect("no work item holds the scene after a cull");
    graph.set_portal_flags(doorway, PortalFlags::CLOSED).unwrap();

    assert!(!culler.cull(&scene, &view).contains(ObjectKind::Renderable, ObjectHandle(1)));
}
