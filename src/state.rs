//! Everything the input handlers are allowed to change, in one place.
//!
//! [`ViewerState`] is owned by the application and handed by reference to the input
//! step and the render step of each frame.

use cgmath::{Deg, Vector4};
use winit::keyboard::KeyCode;

use crate::camera::{Camera, CameraController};

pub const METALLIC_RANGE: (f32, f32) = (0.0, 1.0);
pub const ROUGHNESS_RANGE: (f32, f32) = (0.1, 0.7);
const MATERIAL_STEP: f32 = 0.1;
const SPIN_STEP_DEGREES: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    /// World-space position.
    pub pos: Vector4<f32>,
    pub color: [f32; 4],
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            pos: Vector4::new(0.5, 0.5, 0.5, 1.0),
            color: LightColor::White.rgba(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightColor {
    White,
    Red,
    Green,
    Blue,
}

impl LightColor {
    pub fn rgba(self) -> [f32; 4] {
        match self {
            LightColor::White => [1.0, 1.0, 1.0, 1.0],
            LightColor::Red => [1.0, 0.0, 0.0, 1.0],
            LightColor::Green => [0.0, 1.0, 0.0, 1.0],
            LightColor::Blue => [0.0, 0.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub metallic: f32,
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            metallic: METALLIC_RANGE.0,
            roughness: ROUGHNESS_RANGE.0,
        }
    }
}

impl Material {
    pub fn adjust_metallic(&mut self, delta: f32) {
        self.metallic = (self.metallic + delta).clamp(METALLIC_RANGE.0, METALLIC_RANGE.1);
    }

    pub fn adjust_roughness(&mut self, delta: f32) {
        self.roughness = (self.roughness + delta).clamp(ROUGHNESS_RANGE.0, ROUGHNESS_RANGE.1);
    }
}

/// A discrete edit triggered by one key press or key repeat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewerCommand {
    Exit,
    DollyForward,
    DollyBackward,
    StrafeLeft,
    StrafeRight,
    SpinBy(f32),
    SetLightColor(LightColor),
    AdjustMetallic(f32),
    AdjustRoughness(f32),
}

impl ViewerCommand {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let command = match key {
            KeyCode::Escape => ViewerCommand::Exit,
            KeyCode::KeyW => ViewerCommand::DollyForward,
            KeyCode::KeyS => ViewerCommand::DollyBackward,
            KeyCode::KeyA => ViewerCommand::StrafeLeft,
            KeyCode::KeyD => ViewerCommand::StrafeRight,
            KeyCode::KeyJ => ViewerCommand::SpinBy(SPIN_STEP_DEGREES),
            KeyCode::KeyK => ViewerCommand::SpinBy(-SPIN_STEP_DEGREES),
            KeyCode::Digit1 => ViewerCommand::SetLightColor(LightColor::White),
            KeyCode::Digit2 => ViewerCommand::SetLightColor(LightColor::Red),
            KeyCode::Digit3 => ViewerCommand::SetLightColor(LightColor::Green),
            KeyCode::Digit4 => ViewerCommand::SetLightColor(LightColor::Blue),
            KeyCode::KeyV => ViewerCommand::AdjustMetallic(-MATERIAL_STEP),
            KeyCode::KeyB => ViewerCommand::AdjustMetallic(MATERIAL_STEP),
            KeyCode::KeyN => ViewerCommand::AdjustRoughness(-MATERIAL_STEP),
            KeyCode::KeyM => ViewerCommand::AdjustRoughness(MATERIAL_STEP),
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
    Exit,
}

#[derive(Debug, Default)]
pub struct ViewerState {
    pub camera: Camera,
    pub controller: CameraController,
    pub light: PointLight,
    pub material: Material,
    /// Shared spin angle in degrees, applied to every node each frame. Unbounded.
    pub spin: f32,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spin_angle(&self) -> Deg<f32> {
        Deg(self.spin)
    }

    pub fn apply(&mut self, command: ViewerCommand) {
        match command {
            // handled by the event loop
            ViewerCommand::Exit => (),
            ViewerCommand::DollyForward => self.camera.dolly_forward(),
            ViewerCommand::DollyBackward => self.camera.dolly_backward(),
            ViewerCommand::StrafeLeft => self.camera.strafe_left(),
            ViewerCommand::StrafeRight => self.camera.strafe_right(),
            ViewerCommand::SpinBy(degrees) => self.spin += degrees,
            ViewerCommand::SetLightColor(color) => self.light.color = color.rgba(),
            ViewerCommand::AdjustMetallic(delta) => self.material.adjust_metallic(delta),
            ViewerCommand::AdjustRoughness(delta) => self.material.adjust_roughness(delta),
        }
    }

    /// Apply the edit bound to `key`, if any. Press and repeat events both land here.
    pub fn handle_key(&mut self, key: KeyCode) -> KeyOutcome {
        match ViewerCommand::from_key(key) {
            Some(ViewerCommand::Exit) => KeyOutcome::Exit,
            Some(command) => {
                log::trace!("{:?}", command);
                self.apply(command);
                KeyOutcome::Handled
            }
            None => KeyOutcome::Ignored,
        }
    }
}
