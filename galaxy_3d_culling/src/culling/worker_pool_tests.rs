use std::sync::Arc;
use glam::{Quat, Vec3};
use crate::camera::Frustum;
use crate::geometry::AABB;
use crate::scene::{CullGranularity, Member, MemberChild, ObjectHandle, SceneGraph, SectorKey};
use super::*;
use super::super::occluder_set::OccluderSet;
use super::super::plane_pool::PlanePool;

/// A row of sectors along -Z, each holding one renderable in view.
fn scene(sector_count: u32) -> (Arc<SceneGraph>, Vec<SectorKey>) {
    let mut graph = SceneGraph::new();
    let mut sectors = Vec::new();
    for i in 0..sector_count {
        let z = -(i as f32) * 10.0;
        sectors.push(graph.add_sector(
            AABB::new(Vec3::new(-20.0, -20.0, z - 10.0), Vec3::new(20.0, 20.0, z)),
            false,
        ));
        graph.add_member(Member::new(CullGranularity::Group).with_child(MemberChild::renderable(
            ObjectHandle(i),
            AABB::from_center_extents(Vec3::new(0.0, 0.0, z - 5.0), Vec3::splat(0.5)),
        )));
    }
    (Arc::new(graph), sectors)
}

fn cull_items(scene: &Arc<SceneGraph>, sectors: &[SectorKey], pool: &Arc<PlanePool>) -> Vec<WorkItem> {
    let frustum = Frustum::perspective(Vec3::new(0.0, 0.0, 1.0), Quat::IDENTITY, 1.5, 1.0, 0.1, 500.0);
    sectors
        .iter()
        .map(|&sector| WorkItem::Cull {
            scene: Arc::clone(scene),
            sector,
            planes: pool.acquire_copy(frustum.planes()),
            occluders: OccluderSet::new(),
        })
        .collect()
}

#[test]
fn test_pool_matches_serial_execution() {
    let (scene, sectors) = scene(32);
    let planes = Arc::new(PlanePool::new());

    let mut serial = VisibleSet::new();
    for item in cull_items(&scene, &sectors, &planes) {
        item.execute(&mut serial);
    }

    let pool = WorkerPool::new(3);
    let mut parallel = VisibleSet::new();
    for item in cull_items(&scene, &sectors, &planes) {
        pool.submit(item);
    }
    pool.join(&mut parallel);

    assert_eq!(serial.renderable_count(), 32);
    assert_eq!(parallel, serial);
}

#[test]
fn test_join_releases_scene_and_planes() {
    let (scene, sectors) = scene(8);
    let planes = Arc::new(PlanePool::new());
    let pool = WorkerPool::new(2);

    for item in cull_items(&scene, &sectors, &planes) {
        pool.submit(item);
    }
    let mut out = VisibleSet::new();
    pool.join(&mut out);

    // Every item has been consumed: the scene is uniquely owned again
    assert_eq!(Arc::strong_count(&scene), 1);
    assert_eq!(planes.free_count(), planes.created_count());
}

#[test]
fn test_pool_reusable_across_frames() {
    let (scene, sectors) = scene(4);
    let planes = Arc::new(PlanePool::new());
    let pool = WorkerPool::new(2);

    for _ in 0..5 {
        for item in cull_items(&scene, &sectors, &planes) {
            pool.submit(item);
        }
        let mut out = VisibleSet::new();
        pool.join(&mut out);
        assert_eq!(out.renderable_count(), 4);
    }
}

#[test]
fn test_zero_workers_join_executes_everything() {
    let (scene, sectors) = scene(4);
    let planes = Arc::new(PlanePool::new());
    let pool = WorkerPool::new(0);
    assert_eq!(pool.worker_count(), 0);

    for item in cull_items(&scene, &sectors, &planes) {
        pool.submit(item);
    }
    let mut out = VisibleSet::new();
    pool.join(&mut out);
    assert_eq!(out.renderable_count(), 4);
}

#[test]
fn test_drop_stops_idle_workers() {
    let pool = WorkerPool::new(2);
    assert_eq!(pool.worker_count(), 2);
    drop(pool);
}
