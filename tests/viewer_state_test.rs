use basic_viewer::{
    camera::Camera,
    state::{
        KeyOutcome, LightColor, METALLIC_RANGE, Material, ROUGHNESS_RANGE, ViewerCommand,
        ViewerState,
    },
};
use cgmath::{Deg, Vector4};
use winit::keyboard::KeyCode;

fn press(state: &mut ViewerState, key: KeyCode, times: usize) {
    for _ in 0..times {
        state.handle_key(key);
    }
}

#[test]
fn initial_state() {
    let state = ViewerState::new();

    assert_eq!(state.light.pos, Vector4::new(0.5, 0.5, 0.5, 1.0));
    assert_eq!(state.light.color, [1.0, 1.0, 1.0, 1.0]);
    assert_eq!(state.material, Material { metallic: 0.0, roughness: 0.1 });
    assert_eq!(state.spin_angle(), Deg(0.0));
}

#[test]
fn metallic_is_clamped_to_unit_range() {
    let mut state = ViewerState::new();

    press(&mut state, KeyCode::KeyV, 3);
    assert_eq!(state.material.metallic, METALLIC_RANGE.0);

    press(&mut state, KeyCode::KeyB, 15);
    assert_eq!(state.material.metallic, METALLIC_RANGE.1);

    press(&mut state, KeyCode::KeyV, 1);
    assert!((state.material.metallic - 0.9).abs() < 1e-5);
}

#[test]
fn roughness_is_clamped_between_point_one_and_point_seven() {
    let mut state = ViewerState::new();

    press(&mut state, KeyCode::KeyN, 2);
    assert_eq!(state.material.roughness, ROUGHNESS_RANGE.0);

    press(&mut state, KeyCode::KeyM, 20);
    assert_eq!(state.material.roughness, ROUGHNESS_RANGE.1);
}

#[test]
fn number_keys_pick_the_light_colour() {
    let mut state = ViewerState::new();

    for (key, colour) in [
        (KeyCode::Digit2, [1.0, 0.0, 0.0, 1.0]),
        (KeyCode::Digit3, [0.0, 1.0, 0.0, 1.0]),
        (KeyCode::Digit4, [0.0, 0.0, 1.0, 1.0]),
        (KeyCode::Digit1, [1.0, 1.0, 1.0, 1.0]),
    ] {
        assert_eq!(state.handle_key(key), KeyOutcome::Handled);
        assert_eq!(state.light.color, colour);
    }
    assert_eq!(LightColor::Green.rgba(), [0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn spin_keys_change_the_shared_angle_by_one_degree() {
    let mut state = ViewerState::new();

    press(&mut state, KeyCode::KeyJ, 5);
    assert_eq!(state.spin_angle(), Deg(5.0));

    press(&mut state, KeyCode::KeyK, 7);
    assert_eq!(state.spin_angle(), Deg(-2.0));
}

#[test]
fn movement_keys_drive_the_camera() {
    let mut state = ViewerState::new();

    state.handle_key(KeyCode::KeyW);
    assert!((state.camera.eye.z - 0.9).abs() < 1e-5);

    state.handle_key(KeyCode::KeyA);
    assert!((state.camera.eye.x + 0.1).abs() < 1e-5);
}

#[test]
fn escape_requests_exit_without_touching_state() {
    let mut state = ViewerState::new();

    assert_eq!(state.handle_key(KeyCode::Escape), KeyOutcome::Exit);
    assert_eq!(state.material, Material::default());
    assert_eq!(state.camera, Camera::default());
}

#[test]
fn unbound_keys_are_ignored() {
    let mut state = ViewerState::new();

    assert_eq!(state.handle_key(KeyCode::KeyQ), KeyOutcome::Ignored);
    assert_eq!(state.handle_key(KeyCode::Space), KeyOutcome::Ignored);
    assert_eq!(ViewerCommand::from_key(KeyCode::Digit5), None);
}

#[test]
fn commands_map_from_keys() {
    assert_eq!(ViewerCommand::from_key(KeyCode::KeyS), Some(ViewerCommand::DollyBackward));
    assert_eq!(ViewerCommand::from_key(KeyCode::KeyD), Some(ViewerCommand::StrafeRight));
    assert_eq!(
        ViewerCommand::from_key(KeyCode::Digit2),
        Some(ViewerCommand::SetLightColor(LightColor::Red))
    );
}
