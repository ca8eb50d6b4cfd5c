//! Scene module: the sector/portal graph and everything attached to it.
//!
//! The host owns a `SceneGraph` and mutates it between culls; the culler
//! only reads it.

mod member;
mod occluder;
mod portal;
mod scene_graph;
mod sector;
mod sector_occluder_index;

pub use member::{
    ChildKind, ChildRef, CullGranularity, LightInfo, LightType, Member, MemberChild,
    MemberKey, MemberObserver, ObjectHandle, ObjectKind,
};
pub use occluder::{AutoOrient, Occluder, OccluderDesc, OccluderKey};
pub use portal::{Portal, PortalDesc, PortalFlags, PortalKey, PortalShape};
pub use scene_graph::SceneGraph;
pub use sector::{Sector, SectorKey};
pub use sector_occluder_index::SectorOccluderIndex;
