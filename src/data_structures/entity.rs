//! Placed instances of a model.

use std::rc::Rc;

use cgmath::Vector3;

use crate::data_structures::model::Model;

/// A placement of a [`Model`] in the scene.
///
/// Rotation is stored in degrees per axis and applied X, then Y, then Z when
/// the transformation matrix is built. The model reference is fixed at
/// construction; many entities may share one model.
#[derive(Clone, Debug)]
pub struct Entity {
    model: Rc<Model>,
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: f32,
}

impl Entity {
    pub fn new(model: Rc<Model>, position: Vector3<f32>, rotation: Vector3<f32>, scale: f32) -> Self {
        Self {
            model,
            position,
            rotation,
            scale,
        }
    }

    pub fn model(&self) -> &Rc<Model> {
        &self.model
    }

    pub fn increment_position(&mut self, x: f32, y: f32, z: f32) {
        self.position += Vector3::new(x, y, z);
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vector3::new(x, y, z);
    }

    pub fn increment_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation += Vector3::new(x, y, z);
    }

    pub fn set_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Vector3::new(x, y, z);
    }
}
