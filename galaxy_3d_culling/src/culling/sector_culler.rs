/// SectorCuller: per-frame portal graph walk.
///
/// From the sectors containing the viewpoint, the walk proceeds depth-first
/// through open portals. At each node:
///
/// 1. the node frustum is beveled and the sector's members are culled
///    against it (one work item per node),
/// 2. occluders attached to the sector are turned into occlusion volumes
///    for the node's descendants,
/// 3. every eligible portal is clipped by the node frustum and, if
///    anything is left, a narrower frustum through the clipped polygon is
///    pushed for the sector beyond.
///
/// A shadow post-pass then admits casters reached by visible shadow
/// lights. Leaf and shadow items run on the worker pool when one is
/// configured, otherwise inline through the same code.
///
/// A node reaching a sector through the same portal as an earlier node,
/// with the same frustum, no fewer occluders and no smaller remaining
/// depth, cannot add anything and is skipped. Grids of pass-through
/// portals would otherwise visit every path. `max_traversal_nodes` caps
/// the remaining work.
///
/// The culler owns its scratch buffers and plane pool, so a steady-state
/// frame performs no allocation beyond the visible-set itself.

use std::sync::Arc;
use glam::Vec3;
use rustc_hash::FxHashMap;
use crate::camera::CullView;
use crate::geometry::{
    bevel_planes, clip_polygon_by_planes, frustum_planes_from_polygon, intersects_aabb,
    point_in_convex_polygon, Plane, PLANE_EPSILON,
};
use crate::scene::{ObjectKind, PortalKey, SceneGraph, Sector, SectorKey};
use crate::{engine_debug, engine_trace};
use super::config::CullingConfig;
use super::occluder_set::{OccluderFrustum, OccluderSet};
use super::plane_pool::{PlanePool, PooledPlanes};
use super::shadow_pass::group_shadow_lights;
use super::stats::{CullStats, DebugGeometry};
use super::visible_set::VisibleSet;
use super::work_item::WorkItem;
use super::worker_pool::WorkerPool;

const SOURCE: &str = "galaxy3d::SectorCuller";

/// One pending sector visit.
struct TraversalNode {
    sector: SectorKey,
    planes: PooledPlanes,
    /// Portal crossed to reach this sector (`None` for initial sectors)
    entry_portal: Option<PortalKey>,
    occluders: OccluderSet,
    depth: usize,
}

/// Frustum and occluders a (sector, entry portal) pair was processed with.
struct VisitRecord {
    planes: PooledPlanes,
    occluders: OccluderSet,
    depth: usize,
}

type VisitKey = (SectorKey, Option<PortalKey>);

pub struct SectorCuller {
    config: CullingConfig,
    pool: Option<WorkerPool>,
    plane_pool: Arc<PlanePool>,
    visible: VisibleSet,
    stats: CullStats,
    debug: DebugGeometry,
    // Scratch reused across frames
    stack: Vec<TraversalNode>,
    visits: FxHashMap<VisitKey, Vec<VisitRecord>>,
    sectors: Vec<SectorKey>,
    beveled: Vec<Plane>,
    clipped: Vec<Vec3>,
    clip_scratch: Vec<Vec3>,
    hull: Vec<Vec3>,
    occluder_planes: Vec<Plane>,
}

impl SectorCuller {
    pub fn new(config: CullingConfig) -> Self {
        let config = config.clamped();
        let pool = Self::make_pool(&config);
        Self {
            config,
            pool,
            plane_pool: Arc::new(PlanePool::new()),
            visible: VisibleSet::new(),
            stats: CullStats::default(),
            debug: DebugGeometry::default(),
            stack: Vec::new(),
            visits: FxHashMap::default(),
            sectors: Vec::new(),
            beveled: Vec::new(),
            clipped: Vec::new(),
            clip_scratch: Vec::new(),
            hull: Vec::new(),
            occluder_planes: Vec::new(),
        }
    }

    fn make_pool(config: &CullingConfig) -> Option<WorkerPool> {
        (config.worker_thread_count > 0).then(|| WorkerPool::new(config.worker_thread_count))
    }

    /// Install a new configuration. The worker pool is rebuilt when the
    /// worker count changes.
    pub fn set_config(&mut self, config: CullingConfig) {
        let config = config.clamped();
        if config.worker_thread_count != self.config.worker_thread_count {
            // Old workers are joined before new ones start
            self.pool = None;
            self.pool = Self::make_pool(&config);
        }
        self.config = config;
    }

    // ===== GETTERS =====

    pub fn config(&self) -> &CullingConfig {
        &self.config
    }

    /// Result of the last cull.
    pub fn visible_set(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn stats(&self) -> &CullStats {
        &self.stats
    }

    /// Clipped portals and occluder hulls of the last cull (empty unless
    /// `collect_debug_geometry` is set).
    pub fn debug_geometry(&self) -> &DebugGeometry {
        &self.debug
    }

    /// Worker threads actually running.
    pub fn worker_count(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::worker_count)
    }

    pub fn plane_pool(&self) -> &Arc<PlanePool> {
        &self.plane_pool
    }

    // ===== CULLING =====

    /// Compute the visible-set for `view`.
    ///
    /// Returns once every work item has finished: no item holds the scene
    /// afterwards.
    pub fn cull(&mut self, scene: &Arc<SceneGraph>, view: &CullView) -> &VisibleSet {
        self.visible.clear();
        self.stats = CullStats::default();
        self.debug.clear();

        scene.sectors_containing_point(view.position(), &mut self.sectors);
        let simple = self.config.simple_culling
            || (!self.sectors.is_empty()
                && self.sectors.iter().all(|&s| {
                    scene.sector(s).is_some_and(Sector::is_contiguous_terrain)
                }));

        if simple {
            self.cull_simple(scene, view);
        } else {
            self.walk(scene, view);
        }
        self.finish_batch();

        if self.config.cull_shadows {
            self.shadow_pass(scene);
        }

        self.update_counts(scene);
        engine_trace!(
            SOURCE,
            "Visited {} sectors, {} work items, {} visible ({} renderables, {} lights, {} terrains)",
            self.stats.visited_sectors,
            self.stats.work_items,
            self.visible.len(),
            self.stats.visible_renderables,
            self.stats.visible_lights,
            self.stats.visible_terrains
        );
        &self.visible
    }

    /// Every sector against the raw frustum, without portals or occluders.
    fn cull_simple(&mut self, scene: &Arc<SceneGraph>, view: &CullView) {
        self.stats.simple_mode = true;
        let planes = view.frustum().planes();
        for sector in scene.sector_keys() {
            self.stats.visited_sectors += 1;
            let item = WorkItem::Cull {
                scene: Arc::clone(scene),
                sector,
                planes: self.plane_pool.acquire_copy(planes),
                occluders: OccluderSet::new(),
            };
            self.dispatch(item);
        }
    }

    fn walk(&mut self, scene: &Arc<SceneGraph>, view: &CullView) {
        let frustum = view.frustum();
        for i in 0..self.sectors.len() {
            let node = TraversalNode {
                sector: self.sectors[i],
                planes: self.plane_pool.acquire_copy(frustum.planes()),
                entry_portal: None,
                occluders: OccluderSet::new(),
                depth: 0,
            };
            self.stack.push(node);
        }

        let mut depth_logged = false;
        while let Some(node) = self.stack.pop() {
            let Some(sector) = scene.sector(node.sector) else {
                continue;
            };
            if self.already_covered(&node) {
                self.stats.revisits_skipped += 1;
                continue;
            }
            if self.stats.visited_sectors >= self.config.max_traversal_nodes {
                self.stats.traversal_limited = true;
                engine_debug!(
                    SOURCE,
                    "Traversal node budget {} reached, {} pending nodes dropped",
                    self.config.max_traversal_nodes,
                    self.stack.len() + 1
                );
                self.stack.clear();
                break;
            }
            self.stats.visited_sectors += 1;

            // a. Bevel pass
            bevel_planes(&node.planes, &mut self.beveled);

            // b. Leaf cull of this sector's members
            let item = WorkItem::Cull {
                scene: Arc::clone(scene),
                sector: node.sector,
                planes: self.plane_pool.acquire_copy(&self.beveled),
                occluders: node.occluders.clone(),
            };
            self.dispatch(item);

            // c. Occluders of this sector hide content for the descendants
            let occluders = self.activate_occluders(scene, node.sector, &node.occluders, view.position());

            // d. Portal expansion
            if node.depth >= self.config.max_portal_depth {
                if !sector.portals().is_empty() {
                    self.stats.depth_limited = true;
                    if !depth_logged {
                        engine_debug!(
                            SOURCE,
                            "Portal depth limit {} reached, branch not expanded",
                            self.config.max_portal_depth
                        );
                        depth_logged = true;
                    }
                }
            } else {
                for &portal_key in sector.portals() {
                    match self.expand_portal(scene, view, &node, portal_key, &occluders) {
                        Some(child) => {
                            self.stats.portals_traversed += 1;
                            self.stack.push(child);
                        }
                        None => self.stats.portals_rejected += 1,
                    }
                }
            }
            self.record_visit(node);
        }
        // Records hold pooled plane lists
        self.visits.clear();
    }

    /// Whether an earlier node already covered everything `node` can reach.
    fn already_covered(&self, node: &TraversalNode) -> bool {
        let Some(records) = self.visits.get(&(node.sector, node.entry_portal)) else {
            return false;
        };
        records.iter().any(|r| {
            r.depth <= node.depth
                && r.occluders.is_subset_of(&node.occluders)
                && r.planes.as_slice() == node.planes.as_slice()
        })
    }

    fn record_visit(&mut self, node: TraversalNode) {
        self.visits
            .entry((node.sector, node.entry_portal))
            .or_default()
            .push(VisitRecord { planes: node.planes, occluders: node.occluders, depth: node.depth });
    }

    /// Build occlusion volumes for the occluders of `sector` not already
    /// active, visible through the node frustum, and faced by the viewpoint.
    fn activate_occluders(
        &mut self,
        scene: &SceneGraph,
        sector: SectorKey,
        active: &OccluderSet,
        position: Vec3,
    ) -> OccluderSet {
        let mut added: Vec<OccluderFrustum> = Vec::new();
        for &key in scene.occluders_in_sector(sector) {
            if active.contains_key(key) || added.iter().any(|f| f.key() == key) {
                continue;
            }
            let Some(occluder) = scene.occluder(key) else {
                continue;
            };
            if !intersects_aabb(&self.beveled, &occluder.culling_bounds()) {
                continue;
            }
            if occluder.build_frustum(position, &mut self.hull, &mut self.occluder_planes) {
                added.push(OccluderFrustum::new(key, self.occluder_planes.clone()));
                if self.config.collect_debug_geometry {
                    self.debug.occluder_hulls.push(self.hull.clone());
                }
            }
        }
        self.stats.occluders_activated += added.len();
        active.extended(added)
    }

    /// Try to cross one portal out of `node`. Returns the node for the
    /// sector beyond, or `None` when the portal is rejected.
    fn expand_portal(
        &mut self,
        scene: &Arc<SceneGraph>,
        view: &CullView,
        node: &TraversalNode,
        portal_key: PortalKey,
        occluders: &OccluderSet,
    ) -> Option<TraversalNode> {
        if node.entry_portal == Some(portal_key) {
            return None;
        }
        let portal = scene.portal(portal_key)?;
        if portal.is_closed() {
            return None;
        }
        let (target, forward) = portal.traverse_from(node.sector)?;
        scene.sector(target)?;

        // Shapeless pass-through link: nothing to test against
        let Some(shape) = portal.shape() else {
            return Some(TraversalNode {
                sector: target,
                planes: self.plane_pool.acquire_copy(&node.planes),
                entry_portal: Some(portal_key),
                occluders: occluders.clone(),
                depth: node.depth + 1,
            });
        };

        let position = view.position();
        let near = view.near().max(PLANE_EPSILON);

        // Viewpoint must be on the side we leave from: front when
        // crossing front → back, back otherwise
        let distance = shape.plane.distance(position);
        let signed = if forward { distance } else { -distance };
        if signed < -near {
            return None;
        }
        let inside_near = signed <= near
            && point_in_convex_polygon(position, portal.vertices(), shape.plane.normal);
        if !inside_near && signed <= PLANE_EPSILON {
            return None;
        }

        // Portals entirely on the viewer's side of the entry portal lead back
        let entry_plane = node.entry_portal.and_then(|k| scene.portal(k)).and_then(|p| p.plane());
        if let Some(entry) = entry_plane {
            let view_side = entry.distance(position);
            if view_side.abs() > PLANE_EPSILON {
                let all_near = portal
                    .vertices()
                    .iter()
                    .all(|v| entry.distance(*v) * view_side.signum() > PLANE_EPSILON);
                if all_near {
                    return None;
                }
            }
        }

        if occluders.occludes(&shape.bounds) {
            return None;
        }

        let planes = if portal.is_pass_through() || inside_near {
            self.plane_pool.acquire_copy(&node.planes)
        } else {
            self.clipped.clear();
            self.clipped.extend_from_slice(portal.vertices());
            if !clip_polygon_by_planes(&mut self.clipped, &node.planes, &mut self.clip_scratch) {
                return None;
            }

            let mut planes = self.plane_pool.acquire();
            frustum_planes_from_polygon(&self.clipped, position, &mut planes);
            if planes.len() < 3 {
                return None;
            }
            // Near plane: the portal itself, target sector on the positive side
            planes.push(if forward { shape.plane.flipped() } else { shape.plane });
            planes.push(*view.frustum().far_plane());

            if self.config.collect_debug_geometry {
                self.debug.portal_polygons.push(self.clipped.clone());
            }
            planes
        };

        Some(TraversalNode {
            sector: target,
            planes,
            entry_portal: Some(portal_key),
            occluders: occluders.clone(),
            depth: node.depth + 1,
        })
    }

    fn shadow_pass(&mut self, scene: &Arc<SceneGraph>) {
        if self.visible.shadow_lights().is_empty() {
            return;
        }
        let before = self.visible.len();
        let groups = group_shadow_lights(scene, &self.visible, &mut self.sectors);
        for (sector, lights) in groups {
            let item = WorkItem::Shadow { scene: Arc::clone(scene), sector, lights };
            self.dispatch(item);
        }
        self.finish_batch();
        self.stats.shadow_casters_admitted = self.visible.len() - before;
    }

    fn dispatch(&mut self, item: WorkItem) {
        self.stats.work_items += 1;
        match &self.pool {
            Some(pool) => pool.submit(item),
            None => item.execute(&mut self.visible),
        }
    }

    /// Wait for outstanding work items and collect their results.
    fn finish_batch(&mut self) {
        if let Some(pool) = &self.pool {
            pool.join(&mut self.visible);
        }
    }

    fn update_counts(&mut self, scene: &SceneGraph) {
        let (mut renderables, mut lights, mut terrains) = (0usize, 0usize, 0usize);
        for (_, member) in scene.members() {
            for child in member.children() {
                match child.object_kind() {
                    ObjectKind::Renderable => renderables += 1,
                    ObjectKind::Light => lights += 1,
                    ObjectKind::Terrain => terrains += 1,
                }
            }
        }
        let stats = &mut self.stats;
        stats.visible_renderables = self.visible.renderable_count();
        stats.visible_lights = self.visible.light_count();
        stats.visible_terrains = self.visible.terrain_count();
        stats.culled_renderables = renderables.saturating_sub(stats.visible_renderables);
        stats.culled_lights = lights.saturating_sub(stats.visible_lights);
        stats.culled_terrains = terrains.saturating_sub(stats.visible_terrains);
        stats.shadow_lights = self.visible.shadow_lights().len();
    }
}

#[cfg(test)]
#[path = "sector_culler_tests.rs"]
mod tests;
