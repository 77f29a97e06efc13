//! Viewer position/orientation and the perspective projection.

use cgmath::{Deg, Matrix4, Rad, Vector3, perspective};

/// cgmath produces OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Position and rotation (pitch, yaw, roll in degrees) of the viewer.
///
/// Rotation is never normalised: repeated [`Camera::rotate`] calls may push
/// any component past ±360°.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0))
    }
}

impl Camera {
    pub fn new(position: Vector3<f32>, rotation: Vector3<f32>) -> Self {
        Self { position, rotation }
    }

    /// Move relative to the current yaw.
    ///
    /// `dz` walks forward/back along `(sin(yaw), cos(yaw))` in the xz plane,
    /// `dx` strafes along the same basis rotated by -90°, `dy` is vertical.
    /// At yaw 0 a negative `dz` walks towards -Z.
    pub fn move_by(&mut self, dx: f32, dy: f32, dz: f32) {
        let yaw = Rad::from(Deg(self.rotation.y)).0;
        if dz != 0.0 {
            self.position.x += yaw.sin() * dz;
            self.position.z += yaw.cos() * dz;
        }
        if dx != 0.0 {
            let strafe = Rad::from(Deg(self.rotation.y - 90.0)).0;
            self.position.x += strafe.sin() * dx;
            self.position.z += strafe.cos() * dx;
        }
        self.position.y += dy;
    }

    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation += Vector3::new(dx, dy, dz);
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vector3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vector3::new(x, y, z);
    }
}

/// Perspective projection with a fixed vertical field of view.
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
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
