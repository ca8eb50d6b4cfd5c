//! Culling module: portal graph walk, occlusion, shadow pass, workers.
//!
//! `SectorCuller` is the entry point: one instance per camera, reused every
//! frame. Leaf and shadow work run as `WorkItem`s, either inline or on a
//! `WorkerPool`, and their results are merged into one `VisibleSet`.

mod config;
mod leaf;
mod occluder_set;
mod plane_pool;
mod sector_culler;
mod shadow_pass;
mod stats;
mod visible_set;
mod work_item;
mod worker_pool;

pub use config::{CullingConfig, DEFAULT_MAX_PORTAL_DEPTH, DEFAULT_MAX_TRAVERSAL_NODES};
pub use occluder_set::{OccluderFrustum, OccluderSet};
pub use plane_pool::{PlanePool, PooledPlanes};
pub use sector_culler::SectorCuller;
pub use stats::{CullStats, DebugGeometry};
pub use visible_set::{HandleMap, VisibleSet};
