//! Model and view matrix construction.
//!
//! Angles are stored in degrees everywhere and only turned into radians
//! here. The multiplication order is part of the visual contract and must
//! not be rearranged.

use cgmath::{Deg, Matrix4, Vector3};

use crate::{camera::Camera, data_structures::entity::Entity};

/// `translate(position) * rotateX * rotateY * rotateZ * scale`.
pub fn model_matrix(entity: &Entity) -> Matrix4<f32> {
    compose_model(entity.position, entity.rotation, entity.scale)
}

pub fn compose_model(position: Vector3<f32>, rotation: Vector3<f32>, scale: f32) -> Matrix4<f32> {
    Matrix4::from_translation(position)
        * Matrix4::from_angle_x(Deg(rotation.x))
        * Matrix4::from_angle_y(Deg(rotation.y))
        * Matrix4::from_angle_z(Deg(rotation.z))
        * Matrix4::from_scale(scale)
}

/// `rotateX * rotateY * rotateZ * translate(-position)`: the world moves
/// opposite to the camera.
pub fn view_matrix(camera: &Camera) -> Matrix4<f32> {
    let rotation = camera.rotation;
    Matrix4::from_angle_x(Deg(rotation.x))
        * Matrix4::from_angle_y(Deg(rotation.y))
        * Matrix4::from_angle_z(Deg(rotation.z))
        * Matrix4::from_translation(-camera.position)
}
