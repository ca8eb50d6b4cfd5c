/// Host-side visibility switches.

use crate::scene::ObjectHandle;

/// Receiver of visibility changes.
///
/// Implemented by the host (renderer, light manager, terrain system). The
/// applier calls it only when an object's state actually changes.
///
/// `&mut self` so implementations can record or batch changes.
pub trait VisibilitySink {
    /// Show or hide a renderable.
    fn set_renderable_visible(&mut self, handle: ObjectHandle, visible: bool);

    /// Enable or disable a light.
    fn set_light_visible(&mut self, handle: ObjectHandle, visible: bool);

    /// Toggle a terrain patch's detail. Terrain is never fully hidden.
    fn set_terrain_detail(&mut self, handle: ObjectHandle, detailed: bool);
}
