//! Unit tests for error.rs
//!
//! Tests all Galaxy3dError variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Galaxy3dError, Galaxy3dResult};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_invalid_key_display() {
    let err = Galaxy3dError::InvalidKey("Sector not found".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid key"));
    assert!(display.contains("Sector not found"));
}

#[test]
fn test_invalid_geometry_display() {
    let err = Galaxy3dError::InvalidGeometry("Portal needs at least 3 vertices".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid geometry"));
    assert!(display.contains("3 vertices"));
}

#[test]
fn test_worker_spawn_failed_display() {
    let err = Galaxy3dError::WorkerSpawnFailed("cull-worker-2".to_string());
    assert_eq!(format!("{}", err), "Worker spawn failed: cull-worker-2");
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Galaxy3dError::InvalidKey("k".to_string());
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let debug = format!("{:?}", Galaxy3dError::InvalidGeometry("g".to_string()));
    assert!(debug.contains("InvalidGeometry"));
}

#[test]
fn test_error_clone_and_eq() {
    let err = Galaxy3dError::WorkerSpawnFailed("x".to_string());
    assert_eq!(err.clone(), err);
    assert_ne!(err, Galaxy3dError::InvalidKey("x".to_string()));
}

// ============================================================================
// RESULT ALIAS
// ============================================================================

#[test]
fn test_result_propagation() {
    fn inner() -> Galaxy3dResult<u32> {
        Err(Galaxy3dError::InvalidKey("missing".to_string()))
    }
    fn outer() -> Galaxy3dResult<u32> {
        let value = inner()?;
        Ok(value + 1)
    }

    assert_eq!(outer(), Err(Galaxy3dError::InvalidKey("missing".to_string())));
}

#[test]
fn test_engine_err_macro_builds_variant() {
    let err = crate::engine_err!("galaxy3d::SceneGraph", InvalidKey, "Member {} missing", 7);
    assert_eq!(err, Galaxy3dError::InvalidKey("Member 7 missing".to_string()));
}
