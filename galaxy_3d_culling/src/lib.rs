/*!
# Galaxy 3D Culling

Sector/portal visibility culling for the Galaxy 3D engine.

A scene is partitioned into sectors joined by portals. Every frame the culler
walks the portal graph from the sector(s) containing the viewpoint, clips the
view frustum through each portal, rejects content hidden behind occluders, and
re-admits shadow casters reached by visible lights. The resulting visible-set
is then applied to the host's objects through a `VisibilitySink`.

## Architecture

- **geometry**: planes, bounding boxes, convex polygon clipping
- **camera**: view frustum, cull view, culling camera
- **scene**: sectors, portals, occluders, members and their registry (`SceneGraph`)
- **culling**: graph walk, occluder accumulation, shadow pass, worker pool
- **visibility**: applies visible-sets to the host's objects

The scene graph is owned by the host and passed into the culler as an
`Arc<SceneGraph>`. Nothing about a scene is stored in globals.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod culling;
pub mod geometry;
pub mod scene;
pub mod visibility;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Galaxy3dError, Galaxy3dResult};

    // Logging slot
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Geometry sub-module
    pub mod geometry {
        pub use crate::geometry::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Culling sub-module
    pub mod culling {
        pub use crate::culling::*;
    }

    // Visibility sub-module
    pub mod visibility {
        pub use crate::visibility::*;
    }
}

// Re-export math library at crate root
pub use glam;
