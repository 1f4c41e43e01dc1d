//! Camera model and navigation.
//!
//! The camera is a free eye position and a look-at target with a fixed world up
//! axis. Pointer motion swings the *target* around the eye (the eye never moves on
//! pointer input); the movement keys translate eye and target together.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Transform, Vector3};
use winit::dpi::PhysicalPosition;

pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Degrees of rotation for a pointer sweep across the whole viewport.
pub const ORBIT_DEGREES: f32 = 30.0;
/// Fraction of the eye-to-target vector covered by one movement key press.
pub const STEP_FRACTION: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub look_at: Point3<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, 1.0), (0.0, 0.0, 0.0))
    }
}

impl Camera {
    pub fn new<E: Into<Point3<f32>>, L: Into<Point3<f32>>>(eye: E, look_at: L) -> Self {
        Self {
            eye: eye.into(),
            look_at: look_at.into(),
        }
    }

    /// Right-handed view matrix looking from `eye` at `look_at` with +Y up.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.look_at, WORLD_UP)
    }

    /// Unnormalized vector from the eye to the target.
    pub fn view_direction(&self) -> Vector3<f32> {
        self.look_at - self.eye
    }

    fn translate(&mut self, delta: Vector3<f32>) {
        self.eye += delta;
        self.look_at += delta;
    }

    /// W: step towards the target by a tenth of the eye-to-target vector.
    pub fn dolly_forward(&mut self) {
        self.translate(self.view_direction() * STEP_FRACTION);
    }

    /// S: the reverse of [`Camera::dolly_forward`].
    pub fn dolly_backward(&mut self) {
        self.translate(-self.view_direction() * STEP_FRACTION);
    }

    /// A: step along `(eye - look_at) x up`.
    pub fn strafe_left(&mut self) {
        let back = self.eye - self.look_at;
        self.translate(back.cross(WORLD_UP) * STEP_FRACTION);
    }

    /// D: step along `up x (eye - look_at)`.
    pub fn strafe_right(&mut self) {
        let back = self.eye - self.look_at;
        self.translate(WORLD_UP.cross(back) * STEP_FRACTION);
    }

    /// Swing the target around the eye.
    ///
    /// `dx`/`dy` are pointer deltas normalized by the viewport size. Yaw turns about
    /// world up by `ORBIT_DEGREES * dx`; pitch turns about `up x (eye - look_at)` by
    /// `ORBIT_DEGREES * dy` and is applied after yaw. The pitch axis is taken from the
    /// camera before this call. When that axis degenerates (looking straight up or
    /// down) the pitch part is skipped.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        let yaw = rotate_about(self.eye, WORLD_UP, Deg(ORBIT_DEGREES * dx));
        let pitch_axis = WORLD_UP.cross(self.eye - self.look_at);
        let motion = if pitch_axis.magnitude2() > f32::EPSILON {
            rotate_about(self.eye, pitch_axis.normalize(), Deg(ORBIT_DEGREES * dy)) * yaw
        } else {
            yaw
        };
        self.look_at = motion.transform_point(self.look_at);
    }
}

/// Rotation by `angle` about `axis` through `pivot`: `T(pivot) * R * T(-pivot)`.
pub fn rotate_about<A: Into<Rad<f32>>>(pivot: Point3<f32>, axis: Vector3<f32>, angle: A) -> Matrix4<f32> {
    let offset = pivot.to_vec();
    Matrix4::from_translation(offset)
        * Matrix4::from_axis_angle(axis, angle)
        * Matrix4::from_translation(-offset)
}

/// Perspective projection, rebuilt on resize.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: aspect_ratio(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl Default for Projection {
    /// 90° vertical field of view, near 0.01, far 50.
    fn default() -> Self {
        Self::new(1, 1, Deg(90.0), 0.01, 50.0)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// Turns raw cursor positions into orbit motion.
#[derive(Debug, Default)]
pub struct CameraController {
    last_position: Option<PhysicalPosition<f64>>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one cursor position in window pixels.
    ///
    /// The first position after start only primes the controller. Zero-sized
    /// viewports leave the camera untouched but still record the position.
    pub fn process_pointer(
        &mut self,
        camera: &mut Camera,
        position: PhysicalPosition<f64>,
        viewport: (u32, u32),
    ) {
        let previous = self.last_position.replace(position);
        let Some(previous) = previous else {
            return;
        };
        let (width, height) = viewport;
        if width == 0 || height == 0 {
            return;
        }
        let dx = ((previous.x - position.x) / width as f64) as f32;
        let dy = ((previous.y - position.y) / height as f64) as f32;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        camera.orbit(dx, dy);
    }

    pub fn last_position(&self) -> Option<PhysicalPosition<f64>> {
        self.last_position
    }
}
