//! Integration tests for culling diagnostics through the Engine logger
//!
//! Run with: cargo test --test logging_integration_tests


use std::sync::{Arc, Mutex};
use galaxy_3d_culling::galaxy3d::culling::{CullingConfig, SectorCuller};
use galaxy_3d_culling::galaxy3d::log::{LogEntry, LogSeverity, Logger};
use galaxy_3d_culling::galaxy3d::scene::PortalFlags;
use galaxy_3d_culling::galaxy3d::{Engine, Galaxy3dError};
use galaxy_3d_culling::glam::Vec3;
use scene_test_utils::{view_down_z, RoomChain};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn install() -> Arc<Mutex<Vec<LogEntry>>> {
        let entries = Arc::new(Mutex::new(Vec::new()));
        Engine::set_logger(Self { entries: entries.clone() });
        entries
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn from_source(entries: &Arc<Mutex<Vec<LogEntry>>>, source: &str) -> Vec<LogEntry> {
    entries.lock().unwrap().iter().filter(|e| e.source == source).cloned().collect()
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_config_clamping_warns() {
    let entries = TestLogger::install();

    let culler = SectorCuller::new(CullingConfig {
        worker_thread_count: 100_000,
        max_portal_depth: 0,
        max_traversal_nodes: 0,
        ..Default::default()
    });

    let warnings = from_source(&entries, "galaxy3d::CullingConfig");
    assert_eq!(warnings.len(), 3);
    assert!(warnings.iter().all(|e| e.severity == LogSeverity::Warn));
    assert_eq!(culler.config().max_portal_depth, 1);
    assert_eq!(culler.config().max_traversal_nodes, 1);
    assert!(culler.config().worker_thread_count < 100_000);

    drop(culler);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_invalid_key_logs_error_with_location() {
    let entries = TestLogger::install();

    let mut chain = RoomChain::new(2, 2.0, PortalFlags::empty());
    let doorway = chain.doorways[0];
    chain.graph.remove_portal(doorway).unwrap();
    let result = chain.graph.remove_portal(doorway);

    assert!(matches!(result, Err(Galaxy3dError::InvalidKey(_))));
    let errors = from_source(&entries, "galaxy3d::SceneGraph");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].severity, LogSeverity::Error);
    assert!(errors[0].file.is_some());
    assert!(errors[0].line.is_some());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_cull_summary_logged_at_trace() {
    let entries = TestLogger::install();
    let mut chain = RoomChain::new(2, 2.0, PortalFlags::empty());
    chain.add_box(1, Vec3::new(0.0, 0.0, -10.0));
    let scene = Arc::new(chain.graph);
    let mut culler = SectorCuller::new(CullingConfig::default());

    // Filtered out at the default threshold
    culler.cull(&scene, &view_down_z(Vec3::new(0.0, 0.0, 10.0)));
    assert!(from_source(&entries, "galaxy3d::SectorCuller").is_empty());

    Engine::set_min_severity(LogSeverity::Trace);
    culler.cull(&scene, &view_down_z(Vec3::new(0.0, 0.0, 10.0)));
    let traces = from_source(&entries, "galaxy3d::SectorCuller");
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].severity, LogSeverity::Trace);
    assert!(traces[0].message.contains("Visited 2 sectors"));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_depth_limit_logged_once_per_frame() {
    let entries = TestLogger::install();
    Engine::set_min_severity(LogSeverity::Debug);
    let scene = Arc::new(RoomChain::new(4, 3.0, PortalFlags::PASS_THROUGH).graph);
    let mut culler = SectorCuller::new(CullingConfig { max_portal_depth: 1, ..Default::default() });

    culler.cull(&scene, &view_down_z(Vec3::new(0.0, 0.0, 10.0)));

    let debug: Vec<LogEntry> = from_source(&entries, "galaxy3d::SectorCuller")
        .into_iter()
        .filter(|e| e.severity == LogSeverity::Debug)
        .collect();
    assert_eq!(debug.len(), 1);
    assert!(culler.stats().depth_limited);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_traversal_budget_logged() {
    let entries = TestLogger::install();
    Engine::set_min_severity(LogSeverity::Debug);
    let scene = Arc::new(RoomChain::new(4, 3.0, PortalFlags::PASS_THROUGH).graph);
    let mut culler = SectorCuller::new(CullingConfig { max_traversal_nodes: 2, ..Default::default() });

    culler.cull(&scene, &view_down_z(Vec3::new(0.0, 0.0, 10.0)));

    let debug: Vec<LogEntry> = from_source(&entries, "galaxy3d::SectorCuller")
        .into_iter()
        .filter(|e| e.severity == LogSeverity::Debug)
        .collect();
    assert_eq!(debug.len(), 1);
    assert!(debug[0].message.contains("budget 2"));
    assert_eq!(culler.stats().visited_sectors, 2);
    assert!(culler.stats().traversal_limited);
    assert!(!culler.stats().depth_limited);

    Engine::reset_logger();
}
