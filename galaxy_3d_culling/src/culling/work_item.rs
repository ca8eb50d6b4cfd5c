/// Work items: self-contained units of leaf and shadow work.
///
/// An item owns everything it reads: a handle on the scene, the sector to
/// process and a snapshot of the frustum planes and active occluders. The
/// same `execute` runs on worker threads and, with zero workers, directly
/// on the culling thread.

use std::sync::Arc;
use crate::scene::{SceneGraph, SectorKey};
use super::leaf::cull_sector;
use super::occluder_set::OccluderSet;
use super::plane_pool::PooledPlanes;
use super::shadow_pass::{cull_shadow_casters, ShadowLight};
use super::visible_set::VisibleSet;

pub(crate) enum WorkItem {
    /// Cull one sector's members through a (beveled) frustum
    Cull {
        scene: Arc<SceneGraph>,
        sector: SectorKey,
        planes: PooledPlanes,
        occluders: OccluderSet,
    },
    /// Admit one sector's shadow casters reached by the given lights
    Shadow {
        scene: Arc<SceneGraph>,
        sector: SectorKey,
        lights: Vec<ShadowLight>,
    },
}

impl WorkItem {
    /// Run the item, admitting into `out`. Pooled planes return to their
    /// pool when the item is consumed.
    pub(crate) fn execute(self, out: &mut VisibleSet) {
        match self {
            WorkItem::Cull { scene, sector, planes, occluders } => {
                cull_sector(&scene, sector, &planes, &occluders, out);
            }
            WorkItem::Shadow { scene, sector, lights } => {
                cull_shadow_casters(&scene, sector, &lights, out);
            }
        }
    }
}
