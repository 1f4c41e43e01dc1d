use basic_viewer::{
    camera::{
        Camera, CameraController, ORBIT_DEGREES, Projection, STEP_FRACTION, WORLD_UP,
        rotate_about,
    },
    context::FramebufferSize,
};
use cgmath::{Deg, EuclideanSpace, InnerSpace, Point3, Transform, Vector3};
use winit::dpi::PhysicalPosition;

use crate::common::test_utils::assert_vec3_eq;

mod common;

fn position(x: f64, y: f64) -> PhysicalPosition<f64> {
    PhysicalPosition::new(x, y)
}

fn assert_point_eq(actual: Point3<f32>, expected: Point3<f32>) {
    assert_vec3_eq(actual.to_vec(), expected.to_vec());
}

#[test]
fn default_camera_looks_down_negative_z() {
    let camera = Camera::default();

    assert_point_eq(camera.eye, Point3::new(0.0, 0.0, 1.0));
    assert_point_eq(camera.look_at, Point3::origin());
    assert_vec3_eq(camera.view_direction(), -Vector3::unit_z());
}

#[test]
fn first_pointer_event_only_primes_the_controller() {
    let mut camera = Camera::default();
    let mut controller = CameraController::new();

    controller.process_pointer(&mut camera, position(120.0, 40.0), (800, 800));

    assert_eq!(camera, Camera::default());
    assert_eq!(controller.last_position(), Some(position(120.0, 40.0)));
}

#[test]
fn zero_pointer_delta_leaves_the_camera_unchanged() {
    let mut camera = Camera::default();
    let mut controller = CameraController::new();

    controller.process_pointer(&mut camera, position(300.0, 300.0), (800, 800));
    controller.process_pointer(&mut camera, position(300.0, 300.0), (800, 800));

    assert_eq!(camera, Camera::default());
}

#[test]
fn zero_sized_viewport_is_ignored() {
    let mut camera = Camera::default();
    let mut controller = CameraController::new();

    controller.process_pointer(&mut camera, position(0.0, 0.0), (0, 0));
    controller.process_pointer(&mut camera, position(200.0, 100.0), (0, 0));

    assert_eq!(camera, Camera::default());
    assert_eq!(controller.last_position(), Some(position(200.0, 100.0)));
}

#[test]
fn minimized_window_reports_an_empty_viewport() {
    let mut camera = Camera::default();
    let mut controller = CameraController::new();
    let minimized = FramebufferSize::new(0, 0);

    assert_eq!(FramebufferSize::new(800, 0).viewport(), (0, 0));
    assert_eq!(FramebufferSize::new(800, 600).viewport(), (800, 600));

    controller.process_pointer(&mut camera, position(10.0, 10.0), minimized.viewport());
    controller.process_pointer(&mut camera, position(400.0, 250.0), minimized.viewport());

    assert_eq!(camera, Camera::default());
}

#[test]
fn diagonal_motion_pitches_after_yawing() {
    let eye = Point3::new(0.3, 0.2, 1.0);
    let mut camera = Camera::new(eye, Point3::origin());
    let (dx, dy) = (0.4, 0.7);

    let yaw = rotate_about(eye, WORLD_UP, Deg(ORBIT_DEGREES * dx));
    let pitch_axis = WORLD_UP.cross(eye - Point3::origin()).normalize();
    let pitch = rotate_about(eye, pitch_axis, Deg(ORBIT_DEGREES * dy));
    let expected = (pitch * yaw).transform_point(Point3::origin());
    let swapped = (yaw * pitch).transform_point(Point3::origin());

    camera.orbit(dx, dy);

    assert_point_eq(camera.eye, eye);
    assert_point_eq(camera.look_at, expected);
    assert!((camera.look_at - swapped).magnitude() > 1e-3);
}

#[test]
fn full_width_sweep_yaws_the_target_thirty_degrees_around_the_eye() {
    let mut camera = Camera::default();
    let mut controller = CameraController::new();

    controller.process_pointer(&mut camera, position(800.0, 0.0), (800, 800));
    controller.process_pointer(&mut camera, position(0.0, 0.0), (800, 800));

    let (sin, cos) = (30f32.to_radians().sin(), 30f32.to_radians().cos());
    assert_point_eq(camera.eye, Point3::new(0.0, 0.0, 1.0));
    assert_point_eq(camera.look_at, Point3::new(-sin, 0.0, 1.0 - cos));
}

#[test]
fn vertical_motion_pitches_the_target() {
    let mut camera = Camera::default();

    camera.orbit(0.0, 1.0);

    // Pitch axis is up x (eye - look_at) = +X.
    let (sin, cos) = (30f32.to_radians().sin(), 30f32.to_radians().cos());
    assert_point_eq(camera.eye, Point3::new(0.0, 0.0, 1.0));
    assert_point_eq(camera.look_at, Point3::new(0.0, sin, 1.0 - cos));
}

#[test]
fn looking_straight_down_skips_the_pitch() {
    let mut camera = Camera::new((0.0, 1.0, 0.0), (0.0, 0.0, 0.0));

    camera.orbit(0.0, 0.5);

    assert_point_eq(camera.look_at, Point3::origin());
}

#[test]
fn non_finite_motion_is_ignored() {
    let mut camera = Camera::default();

    camera.orbit(f32::NAN, 0.0);
    camera.orbit(0.0, f32::INFINITY);

    assert_eq!(camera, Camera::default());
}

#[test]
fn dolly_moves_eye_and_target_together() {
    let mut camera = Camera::default();

    camera.dolly_forward();
    assert_point_eq(camera.eye, Point3::new(0.0, 0.0, 1.0 - STEP_FRACTION));
    assert_point_eq(camera.look_at, Point3::new(0.0, 0.0, -STEP_FRACTION));

    camera.dolly_backward();
    assert_point_eq(camera.eye, Point3::new(0.0, 0.0, 1.0));
    assert_point_eq(camera.look_at, Point3::origin());
}

#[test]
fn strafing_moves_sideways_and_keeps_the_view_direction() {
    let mut camera = Camera::default();

    camera.strafe_left();
    // (eye - look_at) x up = (0,0,1) x (0,1,0) = (-1,0,0)
    assert_point_eq(camera.eye, Point3::new(-STEP_FRACTION, 0.0, 1.0));
    assert_vec3_eq(camera.view_direction(), -Vector3::unit_z());

    camera.strafe_right();
    camera.strafe_right();
    assert_point_eq(camera.eye, Point3::new(STEP_FRACTION, 0.0, 1.0));
    assert_point_eq(camera.look_at, Point3::new(STEP_FRACTION, 0.0, 0.0));
}

#[test]
fn projection_tracks_the_aspect_ratio() {
    let mut projection = Projection::new(800, 600, Deg(90.0), 0.01, 50.0);
    assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);

    projection.resize(1000, 500);
    assert!((projection.aspect() - 2.0).abs() < 1e-6);

    projection.resize(0, 500);
    assert_eq!(projection.aspect(), 1.0);
}

#[test]
fn projection_maps_the_near_plane_to_zero_depth() {
    let projection = Projection::default();
    let near = projection.calc_matrix() * cgmath::Vector4::new(0.0, 0.0, -0.01, 1.0);
    let far = projection.calc_matrix() * cgmath::Vector4::new(0.0, 0.0, -50.0, 1.0);

    assert!((near.z / near.w).abs() < 1e-4);
    assert!((far.z / far.w - 1.0).abs() < 1e-4);
}
