//! Error types for Galaxy3D culling
//!
//! Culling itself never fails: degenerate geometry is handled by policy.
//! These errors cover the host-facing operations only (scene graph
//! mutation and worker pool startup).

use std::fmt;

/// Result type for Galaxy3D culling operations
pub type Galaxy3dResult<T> = Result<T, Galaxy3dError>;

/// Galaxy3D culling errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Galaxy3dError {
    /// A sector, portal, occluder or member key that is not (or no longer) in the scene graph
    InvalidKey(String),

    /// Geometry rejected at insertion (e.g. a portal with fewer than 3 vertices)
    InvalidGeometry(String),

    /// A culling worker thread could not be spawned
    WorkerSpawnFailed(String),
}

impl fmt::Display for Galaxy3dError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Galaxy3dError::InvalidKey(msg) => write!(f, "Invalid key: {}", msg),
            Galaxy3dError::InvalidGeometry(msg) => write!(f, "Invalid geometry: {}", msg),
            Galaxy3dError::WorkerSpawnFailed(msg) => write!(f, "Worker spawn failed: {}", msg),
        }
    }
}

impl std::error::Error for Galaxy3dError {}

/// Log an error and build it in one step.
///
/// # Example
///
/// ```ignore
/// return Err(engine_err!("galaxy3d::SceneGraph", InvalidKey, "Sector {:?} not found", key));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Galaxy3dError::$variant(message)
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
