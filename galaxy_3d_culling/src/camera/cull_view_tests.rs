use glam::{Mat4, Quat, Vec3};
use super::*;

#[test]
fn test_perspective_view_stores_parameters() {
    let position = Vec3::new(1.0, 2.0, 3.0);
    let view = CullView::perspective(position, Quat::IDENTITY, 1.0, 1.5, 0.25, 80.0);

    assert_eq!(view.position(), position);
    assert_eq!(view.near(), 0.25);
    assert!(view.frustum().contains_point(position + Vec3::new(0.0, 0.0, -10.0)));
    assert!(!view.frustum().contains_point(position + Vec3::new(0.0, 0.0, 10.0)));
}

#[test]
fn test_view_from_view_projection() {
    let eye = Vec3::new(0.0, 0.0, 5.0);
    let vp = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0)
        * Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
    let view = CullView::from_view_projection(eye, &vp, 0.1);

    assert_eq!(view.position(), eye);
    assert!(view.frustum().contains_point(Vec3::ZERO));
}

#[test]
fn test_negative_near_is_clamped() {
    let frustum = Frustum::perspective(Vec3::ZERO, Quat::IDENTITY, 1.0, 1.0, 0.1, 10.0);
    let view = CullView::new(Vec3::ZERO, frustum, -1.0);
    assert_eq!(view.near(), 0.0);
}
